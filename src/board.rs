// Static board catalog: territories, regions, card shapes and adjacency.
//
// Nothing in here is ever mutated. A match copies the catalog into its own
// territory list at creation time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Europe,
    Asia,
    Africa,
    Oceania,
    SouthAmerica,
    NorthAmerica,
}

pub const ALL_REGIONS: [Region; 6] = [
    Region::Europe,
    Region::Asia,
    Region::Africa,
    Region::Oceania,
    Region::SouthAmerica,
    Region::NorthAmerica,
];

/// Card shape printed on each territory card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryId {
    // Africa
    Algeria,
    Egypt,
    Sudan,
    Congo,
    SouthAfrica,
    Madagascar,

    // Europe
    England,
    Iceland,
    Sweden,
    Moscow,
    Germany,
    Poland,
    Portugal,

    // Asia
    MiddleEast,
    India,
    Vietnam,
    China,
    Aral,
    Omsk,
    Dudinka,
    Siberia,
    Tchita,
    Mongolia,
    Japan,
    Vladivostok,

    // Oceania
    Australia,
    NewGuinea,
    Sumatra,
    Borneo,

    // South America
    Brazil,
    Argentina,
    Chile,
    Colombia,

    // North America
    Mexico,
    California,
    NewYork,
    Labrador,
    Ottawa,
    Vancouver,
    Mackenzie,
    Alaska,
    Greenland,
}

use TerritoryId::*;

/// Canonical catalog order. Match territory lists, the deck and bot scans all follow it.
pub const ALL_TERRITORIES: [TerritoryId; 42] = [
    Algeria, Egypt, Sudan, Congo, SouthAfrica, Madagascar,
    England, Iceland, Sweden, Moscow, Germany, Poland, Portugal,
    MiddleEast, India, Vietnam, China, Aral, Omsk, Dudinka, Siberia, Tchita, Mongolia, Japan, Vladivostok,
    Australia, NewGuinea, Sumatra, Borneo,
    Brazil, Argentina, Chile, Colombia,
    Mexico, California, NewYork, Labrador, Ottawa, Vancouver, Mackenzie, Alaska, Greenland,
];

impl TerritoryId {
    pub fn name(self) -> &'static str {
        match self {
            Algeria => "Argélia",
            Egypt => "Egito",
            Sudan => "Sudão",
            Congo => "Congo",
            SouthAfrica => "África do Sul",
            Madagascar => "Madagascar",

            England => "Inglaterra",
            Iceland => "Islândia",
            Sweden => "Suécia",
            Moscow => "Moscou",
            Germany => "Alemanha",
            Poland => "Polônia",
            Portugal => "Portugal",

            MiddleEast => "Oriente Médio",
            India => "Índia",
            Vietnam => "Vietnã",
            China => "China",
            Aral => "Aral",
            Omsk => "Omsk",
            Dudinka => "Dudinka",
            Siberia => "Sibéria",
            Tchita => "Tchita",
            Mongolia => "Mongólia",
            Japan => "Japão",
            Vladivostok => "Vladivostok",

            Australia => "Austrália",
            NewGuinea => "Nova Guiné",
            Sumatra => "Sumatra",
            Borneo => "Bornéu",

            Brazil => "Brasil",
            Argentina => "Argentina",
            Chile => "Chile",
            Colombia => "Colômbia",

            Mexico => "México",
            California => "Califórnia",
            NewYork => "Nova York",
            Labrador => "Labrador",
            Ottawa => "Ottawa",
            Vancouver => "Vancouver",
            Mackenzie => "Mackenzie",
            Alaska => "Alasca",
            Greenland => "Groenlândia",
        }
    }

    pub fn region(self) -> Region {
        match self {
            Algeria | Egypt | Sudan | Congo | SouthAfrica | Madagascar => Region::Africa,
            England | Iceland | Sweden | Moscow | Germany | Poland | Portugal => Region::Europe,
            MiddleEast | India | Vietnam | China | Aral | Omsk | Dudinka | Siberia | Tchita
            | Mongolia | Japan | Vladivostok => Region::Asia,
            Australia | NewGuinea | Sumatra | Borneo => Region::Oceania,
            Brazil | Argentina | Chile | Colombia => Region::SouthAmerica,
            Mexico | California | NewYork | Labrador | Ottawa | Vancouver | Mackenzie | Alaska
            | Greenland => Region::NorthAmerica,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Algeria | Congo | England | Moscow | MiddleEast | China | Dudinka | Mongolia
            | Australia | Brazil | Mexico | Labrador | Mackenzie => Shape::Circle,
            Egypt | SouthAfrica | Iceland | Germany | Portugal | India | Aral | Siberia | Japan
            | NewGuinea | Borneo | Argentina | Colombia | California | Ottawa | Alaska => {
                Shape::Square
            }
            Sudan | Madagascar | Sweden | Poland | Vietnam | Omsk | Tchita | Vladivostok
            | Sumatra | Chile | NewYork | Vancouver | Greenland => Shape::Triangle,
        }
    }

    pub fn adjacent(self) -> &'static [TerritoryId] {
        match self {
            Algeria => &[Egypt, Sudan, Congo, Portugal, Brazil],
            Egypt => &[Algeria, Sudan, MiddleEast, Poland, Portugal],
            Sudan => &[Algeria, Egypt, Congo, SouthAfrica, Madagascar],
            Congo => &[Algeria, Sudan, SouthAfrica],
            SouthAfrica => &[Sudan, Congo, Madagascar],
            Madagascar => &[Sudan, SouthAfrica],

            England => &[Iceland, Sweden, Germany, Portugal],
            Iceland => &[England, Sweden, Greenland],
            Sweden => &[England, Iceland, Moscow, Germany, Poland],
            Moscow => &[Sweden, Poland, Aral, Omsk],
            Germany => &[England, Sweden, Poland, Portugal],
            Poland => &[Sweden, Moscow, Germany, MiddleEast, Egypt],
            Portugal => &[England, Germany, Algeria, Brazil, Egypt],

            MiddleEast => &[Egypt, Poland, India, Aral],
            India => &[MiddleEast, Vietnam, China, Aral],
            Vietnam => &[India, China, Borneo],
            China => &[India, Vietnam, Mongolia, Vladivostok],
            Aral => &[Moscow, MiddleEast, India, Omsk],
            Omsk => &[Moscow, Aral, Dudinka, Mongolia],
            Dudinka => &[Omsk, Siberia, Mongolia, Mackenzie],
            Siberia => &[Dudinka, Tchita, Vladivostok, Alaska],
            Tchita => &[Siberia, Mongolia, Vladivostok],
            Mongolia => &[China, Omsk, Dudinka, Tchita, Japan],
            Japan => &[Mongolia, Vladivostok],
            Vladivostok => &[China, Siberia, Tchita, Japan],

            Australia => &[NewGuinea, Sumatra, Borneo],
            NewGuinea => &[Australia, Sumatra, Borneo],
            Sumatra => &[Australia, NewGuinea, Borneo],
            Borneo => &[Australia, NewGuinea, Sumatra, Vietnam],

            Brazil => &[Algeria, Argentina, Chile, Colombia, Portugal],
            Argentina => &[Brazil, Chile],
            Chile => &[Brazil, Argentina, Colombia],
            Colombia => &[Brazil, Chile, Mexico],

            Mexico => &[Colombia, California, NewYork],
            California => &[Mexico, NewYork, Ottawa, Vancouver],
            NewYork => &[Mexico, California, Labrador, Ottawa],
            Labrador => &[NewYork, Ottawa, Greenland],
            Ottawa => &[California, NewYork, Labrador, Vancouver, Mackenzie],
            Vancouver => &[California, Ottawa, Mackenzie, Alaska],
            Mackenzie => &[Ottawa, Vancouver, Alaska, Dudinka, Greenland],
            Alaska => &[Vancouver, Mackenzie, Siberia],
            Greenland => &[Iceland, Labrador, Mackenzie],
        }
    }

    pub fn is_adjacent(self, other: TerritoryId) -> bool {
        self.adjacent().contains(&other)
    }
}

impl Region {
    pub fn territories(self) -> impl Iterator<Item = TerritoryId> {
        ALL_TERRITORIES
            .into_iter()
            .filter(move |territory| territory.region() == self)
    }
}
