use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveId {
    ConquerEuropeOceaniaAndOne,
    ConquerAsiaSouthAmerica,
    ConquerEuropeSouthAmericaAndOne,
    Conquer18TerritoriesWith2Armies,
    ConquerAsiaAfrica,
    ConquerNorthAmericaAfrica,
    Conquer24Territories,
    ConquerNorthAmericaOceania,
}

pub const ALL_OBJECTIVES: [ObjectiveId; 8] = [
    ObjectiveId::ConquerEuropeOceaniaAndOne,
    ObjectiveId::ConquerAsiaSouthAmerica,
    ObjectiveId::ConquerEuropeSouthAmericaAndOne,
    ObjectiveId::Conquer18TerritoriesWith2Armies,
    ObjectiveId::ConquerAsiaAfrica,
    ObjectiveId::ConquerNorthAmericaAfrica,
    ObjectiveId::Conquer24Territories,
    ObjectiveId::ConquerNorthAmericaOceania,
];

/// What an objective asks for. Only recorded; nothing evaluates it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveKind {
    RegionConquest {
        regions: &'static [Region],
        plus_any_region: bool,
    },
    TerritoryCount {
        territories: u32,
        min_armies: u32,
    },
}

impl ObjectiveId {
    pub fn description(self) -> &'static str {
        match self {
            ObjectiveId::ConquerEuropeOceaniaAndOne => {
                "Conquistar na totalidade a EUROPA, a OCEANIA e mais um terceiro."
            }
            ObjectiveId::ConquerAsiaSouthAmerica => {
                "Conquistar na totalidade a ÁSIA e a AMÉRICA DO SUL."
            }
            ObjectiveId::ConquerEuropeSouthAmericaAndOne => {
                "Conquistar na totalidade a EUROPA, a AMÉRICA DO SUL e mais um terceiro."
            }
            ObjectiveId::Conquer18TerritoriesWith2Armies => {
                "Conquistar 18 TERRITÓRIOS e ocupar cada um deles com pelo menos dois exércitos."
            }
            ObjectiveId::ConquerAsiaAfrica => "Conquistar na totalidade a ÁSIA e a ÁFRICA.",
            ObjectiveId::ConquerNorthAmericaAfrica => {
                "Conquistar na totalidade a AMÉRICA DO NORTE e a ÁFRICA."
            }
            ObjectiveId::Conquer24Territories => "Conquistar 24 TERRITÓRIOS à sua escolha.",
            ObjectiveId::ConquerNorthAmericaOceania => {
                "Conquistar na totalidade a AMÉRICA DO NORTE e a OCEANIA."
            }
        }
    }

    pub fn kind(self) -> ObjectiveKind {
        match self {
            ObjectiveId::ConquerEuropeOceaniaAndOne => ObjectiveKind::RegionConquest {
                regions: &[Region::Europe, Region::Oceania],
                plus_any_region: true,
            },
            ObjectiveId::ConquerAsiaSouthAmerica => ObjectiveKind::RegionConquest {
                regions: &[Region::Asia, Region::SouthAmerica],
                plus_any_region: false,
            },
            ObjectiveId::ConquerEuropeSouthAmericaAndOne => ObjectiveKind::RegionConquest {
                regions: &[Region::Europe, Region::SouthAmerica],
                plus_any_region: true,
            },
            ObjectiveId::Conquer18TerritoriesWith2Armies => ObjectiveKind::TerritoryCount {
                territories: 18,
                min_armies: 2,
            },
            ObjectiveId::ConquerAsiaAfrica => ObjectiveKind::RegionConquest {
                regions: &[Region::Asia, Region::Africa],
                plus_any_region: false,
            },
            ObjectiveId::ConquerNorthAmericaAfrica => ObjectiveKind::RegionConquest {
                regions: &[Region::NorthAmerica, Region::Africa],
                plus_any_region: false,
            },
            ObjectiveId::Conquer24Territories => ObjectiveKind::TerritoryCount {
                territories: 24,
                min_armies: 1,
            },
            ObjectiveId::ConquerNorthAmericaOceania => ObjectiveKind::RegionConquest {
                regions: &[Region::NorthAmerica, Region::Oceania],
                plus_any_region: false,
            },
        }
    }
}

/// Draws `count` objectives without replacement. Returns fewer when the pool runs out.
pub fn deal<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<ObjectiveId> {
    ALL_OBJECTIVES
        .choose_multiple(rng, count.min(ALL_OBJECTIVES.len()))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;
    use std::collections::HashSet;

    #[test]
    fn test_deal_without_replacement() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let dealt = deal(&mut rng, 6);
        assert_eq!(dealt.len(), 6);

        let unique: HashSet<_> = dealt.iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_deal_more_than_available() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let dealt = deal(&mut rng, 20);
        assert_eq!(dealt.len(), ALL_OBJECTIVES.len());
    }

    #[test]
    fn test_every_objective_has_description() {
        for objective in ALL_OBJECTIVES {
            assert!(!objective.description().is_empty());
            match objective.kind() {
                ObjectiveKind::RegionConquest { regions, .. } => assert_eq!(regions.len(), 2),
                ObjectiveKind::TerritoryCount { territories, .. } => assert!(territories >= 18),
            }
        }
    }
}
