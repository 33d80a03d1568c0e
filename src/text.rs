//! Descriptive text panels shown beside the public dashboard's figures.
//!
//! Lookups are static: one block per colour map for the globe and one per
//! continent for the regional isoline map.

use crate::colormap::ColorMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub heading: &'static str,
    pub body: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Reference {
    pub citation: &'static str,
    pub title: &'static str,
    pub url: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TextBlock {
    pub title: &'static str,
    pub sections: &'static [Section],
    pub references: &'static [Reference],
}

/// Shared by geo and viridis; viridis only changes the title.
const CAUSES: &[Section] = &[
    Section {
        heading: "",
        body: CAUSES_INTRO,
    },
    Section {
        heading: "Burning Fossil Fuels",
        body: "Fossil fuels such as oil, gas, and coal contain carbon dioxide that has been 'locked away' \
               in the ground for thousands of years. When we take these out of the land and burn them, \
               we release the stored carbon dioxide into the air.",
    },
    Section {
        heading: "Deforestation",
        body: "Forests remove and store carbon dioxide from the atmosphere. Cutting them down means that \
               carbon dioxide builds up quicker since there are no trees to absorb it. Not only that, \
               trees release the carbon they stored when we burn them.",
    },
    Section {
        heading: "Agriculture",
        body: "Planting crops and rearing animals release many different types of greenhouse gases into \
               the air. For example, animals produce methane, which is 30 times more powerful than carbon \
               dioxide as a greenhouse gas. The nitrous oxide used for fertilizers is ten times worse and \
               is nearly 300 times more potent than carbon dioxide!",
    },
    Section {
        heading: "Cement",
        body: "Producing cement is another contributor to climate change, causing 2 percent of our entire \
               carbon dioxide emissions.",
    },
];

const CAUSES_INTRO: &str = "Climate change can be a natural process where temperature, rainfall, wind, \
    and other elements vary over decades or more. In millions of years, our world has been warmer and \
    colder than it is now. But today we are experiencing unprecedented rapid warming from human \
    activities, primarily due to burning fossil fuels that generate greenhouse gas emissions.";

const MET_OFFICE: &[Reference] = &[Reference {
    citation: "Causes of climate change. Met Office.",
    title: "Causes of climate change - Met Office",
    url: "https://www.metoffice.gov.uk/weather/climate-change/causes-of-climate-change",
}];

pub static GEO: TextBlock = TextBlock {
    title: "Causes of Climate Change",
    sections: CAUSES,
    references: MET_OFFICE,
};

pub static VIRIDIS: TextBlock = TextBlock {
    title: "Causes of Climate Change [Colourblind Friendly Map]",
    sections: CAUSES,
    references: MET_OFFICE,
};

pub static OCEAN: TextBlock = TextBlock {
    title: "Effects of Climate Change - Ocean Related Data",
    sections: &[
        Section {
            heading: "Sea Level Rise",
            body: "Sea-level rise has accelerated in recent decades due to increasing ice loss in the \
                   world's polar regions. Latest data from the World Meteorological Organization shows \
                   that global mean sea-level reached a new record high in 2021, rising an average of \
                   4.5 millimeters per year over the period 2013 to 2021.",
        },
        Section {
            heading: "Marine Heatwaves",
            body: "Marine heatwaves have doubled in frequency, and have become longer-lasting, more \
                   intense and extensive. The IPCC says that human influence has been the main driver \
                   of the ocean heat increase observed since the 1970s. The majority of heatwaves took \
                   place between 2006 and 2015, causing widespread coral bleaching and reef degradation.",
        },
        Section {
            heading: "Loss of Marine Biodiversity",
            body: "At a 1.1°C increase in temperature today, an estimated 60 percent of the world's \
                   marine ecosystems have already been degraded or are being used unsustainably. A \
                   warming of 1.5°C threatens to destroy 70 to 90 percent of coral reefs, and a 2°C \
                   increase means a nearly 100 percent loss - a point of no return.",
        },
    ],
    references: &[Reference {
        citation: "Climate Change. United Nations.",
        title: "Climate Change - United Nations",
        url: "https://www.un.org/en/climatechange",
    }],
};

pub static EUROPE: TextBlock = TextBlock {
    title: "Solution from Europe",
    sections: &[Section {
        heading: "",
        body: "With the European Climate Law, the EU made climate neutrality by 2050 a legally binding \
               goal, set an interim target of a net 55 percent emission reduction by 2030, and is \
               working on setting the 2040 target. The Fit for 55 proposal aims to bring EU legislation \
               in line with the 2030 goal.",
    }],
    references: &[Reference {
        citation: "Climate Change Mitigation: Reducing Emissions. European Environment.",
        title: "Climate Change Mitigation: Reducing Emissions - European Environment",
        url: "https://www.eea.europa.eu/en/topics/in-depth/climate-change-mitigation-reducing-emissions",
    }],
};

pub static NORTH_AMERICA: TextBlock = TextBlock {
    title: "Solution from North America",
    sections: &[Section {
        heading: "",
        body: "Reducing U.S. greenhouse gas emissions 50-52 percent below 2005 levels in 2030. Reaching \
               100 percent carbon pollution-free electricity by 2035. Achieving a net-zero emissions \
               economy by 2050. Delivering 40 percent of the benefits from federal investments in \
               climate and clean energy to disadvantaged communities.",
    }],
    references: &[Reference {
        citation: "National Climate Task Force. The White House.",
        title: "President Biden's Actions to Tackle the Climate Crisis",
        url: "https://www.whitehouse.gov/climate",
    }],
};

pub static AFRICA: TextBlock = TextBlock {
    title: "Solution from Africa",
    sections: &[Section {
        heading: "",
        body: "A solution to the crisis comes in the form of green bonds. This wholesale finance is \
               based on fundraising for environmentally friendly projects, such as renewable energies \
               or clean transport. Most of Africa's green bonds have been issued by the AfDB, which has \
               raised more than $1.5bn since 2013.",
    }],
    references: &[Reference {
        citation: "Climate Change Injustice. African Business.",
        title: "The injustice of climate change: What solutions for Africa?",
        url: "https://african.business/2023/10/resources/the-injustice-of-climate-change-what-solutions-for-africa",
    }],
};

pub static OCEANIA: TextBlock = TextBlock {
    title: "Solution from Oceania",
    sections: &[Section {
        heading: "",
        body: "In 2019, New Zealand passed the Climate Change Response (Zero Carbon) Amendment Act, \
               setting the targets of reducing net emissions of greenhouse gases (other than biogenic \
               methane) to zero by 2050, as well as to reduce biogenic emissions to 10 percent below \
               2017 levels by 2030, and to 24-27 percent by 2050.",
    }],
    references: &[Reference {
        citation: "About Partners. Climate and Clean Air Coalition.",
        title: "New Zealand - CCAC Partner",
        url: "https://www.ccacoalition.org/partners/new-zealand",
    }],
};

pub static ASIA: TextBlock = TextBlock {
    title: "Solution from Asia",
    sections: &[Section {
        heading: "",
        body: "As an extremely biodiverse region, Southeast Asia has the potential to sequester carbon \
               and create carbon credits through nature-based climate solutions such as restoring \
               forests and wetlands, regenerative farming, and harnessing the region's abundant clean \
               energy.",
    }],
    references: &[Reference {
        citation: "Solving Climate Change (Finance). Imperial College Business School.",
        title: "Solving climate change: unleashing the potential of Southeast Asia",
        url: "https://www.imperial.ac.uk/business-school/ib-knowledge/finance/solving-climate-change-unleashing-the-potential-southeast-asia",
    }],
};

pub static SOUTH_AMERICA: TextBlock = TextBlock {
    title: "Solution from South America",
    sections: &[Section {
        heading: "",
        body: "Among the best-known adaptation measures are building safer, sustainable, and resilient \
               infrastructures, conserving and restoring forests and natural ecosystems, implementing \
               nature-based solutions, managing disaster risks, and diversifying crops.",
    }],
    references: &[Reference {
        citation: "Latin American Solutions. CAF.",
        title: "3 Latin American Solutions Against Climate Change",
        url: "https://www.caf.com/en/currently/news/2023/11/3-latin-american-solutions-against-climate-change/",
    }],
};

/// Globe panel text for a colour map.
pub fn color_map_text(map: ColorMap) -> Option<&'static TextBlock> {
    match map {
        ColorMap::Geo => Some(&GEO),
        ColorMap::Viridis => Some(&VIRIDIS),
        ColorMap::Ocean => Some(&OCEAN),
        ColorMap::Relief | ColorMap::Topo | ColorMap::Turbo | ColorMap::Jet => None,
    }
}

/// Regional panel text for a continent name.
pub fn continent_text(name: &str) -> Option<&'static TextBlock> {
    match name {
        "Europe" => Some(&EUROPE),
        "North America" => Some(&NORTH_AMERICA),
        "Africa" => Some(&AFRICA),
        "Oceania" => Some(&OCEANIA),
        "Asia" => Some(&ASIA),
        "South America" => Some(&SOUTH_AMERICA),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::CONTINENTS;

    #[test]
    fn every_continent_has_text() {
        for name in CONTINENTS {
            let block = continent_text(name).unwrap();
            assert!(block.title.ends_with(name));
            assert!(!block.references.is_empty());
        }
        assert!(continent_text("World").is_none());
    }

    #[test]
    fn ocean_text_differs_from_land_text() {
        let ocean = color_map_text(ColorMap::Ocean).unwrap();
        assert_ne!(ocean, color_map_text(ColorMap::Geo).unwrap());
        assert!(ocean.title.contains("Ocean"));
        assert!(color_map_text(ColorMap::Jet).is_none());
    }
}
