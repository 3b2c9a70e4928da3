//! Vessel category lookup for AIS ship-type codes.
//!
//! Codes 0-99 resolve through a table built at compile time. Labels pass
//! through unchanged so operators can override the category of a vessel.

use super::record::ShipType;

/// Category returned for absent or unknown ship types.
pub const DEFAULT_CATEGORY: &str = "default";

/// Coarse vessel category used to select a display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipCategory {
    Default,
    Wig,
    Fishing,
    Towing,
    TowingExceed,
    DredgingUnderwater,
    DivingOps,
    MilitaryOps,
    Sailing,
    PleasureCraft,
    Hsc,
    HscA,
    HscB,
    HscC,
    HscD,
    Pilot,
    Rescue,
    Tug,
    PortTender,
    AntiPollutionEq,
    LawEnforcement,
    LocalVessel,
    MedicalTransport,
    Noncombatant,
    Passenger,
    PassengerA,
    PassengerB,
    PassengerC,
    PassengerD,
    Cargo,
    CargoA,
    CargoB,
    CargoC,
    CargoD,
    Tanker,
    TankerA,
    TankerB,
    TankerC,
    TankerD,
    Other,
    OtherA,
    OtherB,
    OtherC,
    OtherD,
}

impl ShipCategory {
    /// Label consumed by the color lookup.
    pub const fn as_str(self) -> &'static str {
        match self {
            ShipCategory::Default => DEFAULT_CATEGORY,
            ShipCategory::Wig => "WIG",
            ShipCategory::Fishing => "FISHING",
            ShipCategory::Towing => "TOWING",
            ShipCategory::TowingExceed => "TOWING_EXCEED",
            ShipCategory::DredgingUnderwater => "DREDGING_UNDERWATER",
            ShipCategory::DivingOps => "DIVING_OPS",
            ShipCategory::MilitaryOps => "MILITARY_OPS",
            ShipCategory::Sailing => "SAILING",
            ShipCategory::PleasureCraft => "PLEASURE_CRAFT",
            ShipCategory::Hsc => "HSC",
            ShipCategory::HscA => "HSC_A",
            ShipCategory::HscB => "HSC_B",
            ShipCategory::HscC => "HSC_C",
            ShipCategory::HscD => "HSC_D",
            ShipCategory::Pilot => "PILOT",
            ShipCategory::Rescue => "RESCUE",
            ShipCategory::Tug => "TUG",
            ShipCategory::PortTender => "PORT_TENDER",
            ShipCategory::AntiPollutionEq => "ANTI_POLLUTION_EQ",
            ShipCategory::LawEnforcement => "LAW_ENFORCEMENT",
            ShipCategory::LocalVessel => "LOCAL_VESSEL",
            ShipCategory::MedicalTransport => "MEDICAL_TRANSPORT",
            ShipCategory::Noncombatant => "NONCOMBATANT",
            ShipCategory::Passenger => "PASSENGER",
            ShipCategory::PassengerA => "PASSENGER_A",
            ShipCategory::PassengerB => "PASSENGER_B",
            ShipCategory::PassengerC => "PASSENGER_C",
            ShipCategory::PassengerD => "PASSENGER_D",
            ShipCategory::Cargo => "CARGO",
            ShipCategory::CargoA => "CARGO_A",
            ShipCategory::CargoB => "CARGO_B",
            ShipCategory::CargoC => "CARGO_C",
            ShipCategory::CargoD => "CARGO_D",
            ShipCategory::Tanker => "TANKER",
            ShipCategory::TankerA => "TANKER_A",
            ShipCategory::TankerB => "TANKER_B",
            ShipCategory::TankerC => "TANKER_C",
            ShipCategory::TankerD => "TANKER_D",
            ShipCategory::Other => "OTHER",
            ShipCategory::OtherA => "OTHER_A",
            ShipCategory::OtherB => "OTHER_B",
            ShipCategory::OtherC => "OTHER_C",
            ShipCategory::OtherD => "OTHER_D",
        }
    }

    /// Category for a numeric AIS ship-type code.
    pub fn from_code(code: u16) -> Self {
        CATEGORY_TABLE
            .get(code as usize)
            .copied()
            .unwrap_or(ShipCategory::Default)
    }
}

/// Number of defined AIS ship-type codes.
const CODE_SPACE: usize = 100;

static CATEGORY_TABLE: [ShipCategory; CODE_SPACE] = build_table();

/// Fill a decade whose `x0` and `x5..x9` codes share a parent bucket and
/// `x1..x4` carry hazard sub-variants A-D.
const fn fill_decade(
    mut table: [ShipCategory; CODE_SPACE],
    base: usize,
    parent: ShipCategory,
    variants: [ShipCategory; 4],
) -> [ShipCategory; CODE_SPACE] {
    let mut i = 0;
    while i < 10 {
        table[base + i] = if i >= 1 && i <= 4 {
            variants[i - 1]
        } else {
            parent
        };
        i += 1;
    }
    table
}

const fn build_table() -> [ShipCategory; CODE_SPACE] {
    use ShipCategory::*;

    let mut table = [ShipCategory::Default; CODE_SPACE];

    let mut code = 20;
    while code <= 29 {
        table[code] = Wig;
        code += 1;
    }

    table[30] = Fishing;
    table[31] = Towing;
    table[32] = TowingExceed;
    table[33] = DredgingUnderwater;
    table[34] = DivingOps;
    table[35] = MilitaryOps;
    table[36] = Sailing;
    table[37] = PleasureCraft;

    table = fill_decade(table, 40, Hsc, [HscA, HscB, HscC, HscD]);

    table[50] = Pilot;
    table[51] = Rescue;
    table[52] = Tug;
    table[53] = PortTender;
    table[54] = AntiPollutionEq;
    table[55] = LawEnforcement;
    table[56] = LocalVessel;
    table[57] = LocalVessel;
    table[58] = MedicalTransport;
    table[59] = Noncombatant;

    table = fill_decade(
        table,
        60,
        Passenger,
        [PassengerA, PassengerB, PassengerC, PassengerD],
    );
    table = fill_decade(table, 70, Cargo, [CargoA, CargoB, CargoC, CargoD]);
    table = fill_decade(table, 80, Tanker, [TankerA, TankerB, TankerC, TankerD]);
    fill_decade(table, 90, Other, [OtherA, OtherB, OtherC, OtherD])
}

/// Resolve a ship type to its display category.
pub fn classify(ship_type: Option<&ShipType>) -> &str {
    match ship_type {
        None => DEFAULT_CATEGORY,
        Some(ShipType::Label(label)) => label.as_str(),
        Some(ShipType::Code(code)) => ShipCategory::from_code(*code).as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(c: u16) -> &'static str {
        ShipCategory::from_code(c).as_str()
    }

    #[test]
    fn test_cargo() {
        assert_eq!(classify(Some(&ShipType::Code(70))), "CARGO");
        assert_eq!(code(71), "CARGO_A");
        assert_eq!(code(74), "CARGO_D");
        assert_eq!(code(79), "CARGO");
    }

    #[test]
    fn test_wig_range() {
        for c in 20..=29 {
            assert_eq!(code(c), "WIG", "code {}", c);
        }
    }

    #[test]
    fn test_absent_is_default() {
        assert_eq!(classify(None), "default");
    }

    #[test]
    fn test_label_passes_through() {
        let label = ShipType::Label("already_a_label".to_string());
        assert_eq!(classify(Some(&label)), "already_a_label");
    }

    #[test]
    fn test_local_vessel_pair() {
        assert_eq!(code(56), "LOCAL_VESSEL");
        assert_eq!(code(57), "LOCAL_VESSEL");
    }

    #[test]
    fn test_special_craft() {
        assert_eq!(code(30), "FISHING");
        assert_eq!(code(31), "TOWING");
        assert_eq!(code(32), "TOWING_EXCEED");
        assert_eq!(code(35), "MILITARY_OPS");
        assert_eq!(code(36), "SAILING");
        assert_eq!(code(37), "PLEASURE_CRAFT");
        assert_eq!(code(50), "PILOT");
        assert_eq!(code(52), "TUG");
        assert_eq!(code(59), "NONCOMBATANT");
    }

    #[test]
    fn test_sub_variants() {
        assert_eq!(code(40), "HSC");
        assert_eq!(code(42), "HSC_B");
        assert_eq!(code(47), "HSC");
        assert_eq!(code(63), "PASSENGER_C");
        assert_eq!(code(69), "PASSENGER");
        assert_eq!(code(81), "TANKER_A");
        assert_eq!(code(90), "OTHER");
        assert_eq!(code(94), "OTHER_D");
    }

    #[test]
    fn test_unassigned_codes_are_default() {
        for c in (0..20).chain([38, 39, 100, 255, u16::MAX]) {
            assert_eq!(code(c), "default", "code {}", c);
        }
    }
}
