//! A small table of Boston-area restaurants the simulated providers
//! serve from.

use dine_map_models::{Coordinate, DetailedResult, PreloadedEntry, ResultEntry, Review};

/// One simulated restaurant record.
pub struct Fixture {
    pub id: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub rating: f64,
    pub price_level: u8,
    pub tags: &'static [&'static str],
    pub phone: &'static str,
    pub website: &'static str,
    pub hours: &'static str,
}

pub const ALL: &[Fixture] = &[
    Fixture {
        id: "sim-giulia",
        name: "Giulia",
        address: "1682 Massachusetts Ave, Cambridge, MA",
        lat: 42.3821,
        lng: -71.1212,
        rating: 4.7,
        price_level: 3,
        tags: &["italian_restaurant", "pasta"],
        phone: "(617) 441-2800",
        website: "https://giuliarestaurant.example.com",
        hours: "Open until 10 PM",
    },
    Fixture {
        id: "sim-oleana",
        name: "Oleana",
        address: "134 Hampshire St, Cambridge, MA",
        lat: 42.3718,
        lng: -71.0978,
        rating: 4.6,
        price_level: 3,
        tags: &["mediterranean_restaurant", "turkish"],
        phone: "(617) 661-0505",
        website: "https://oleana.example.com",
        hours: "Open until 10 PM",
    },
    Fixture {
        id: "sim-neptune",
        name: "Neptune Oyster",
        address: "63 Salem St, Boston, MA",
        lat: 42.3634,
        lng: -71.0560,
        rating: 4.6,
        price_level: 3,
        tags: &["seafood_restaurant", "oyster_bar"],
        phone: "(617) 742-3474",
        website: "https://neptuneoyster.example.com",
        hours: "Open until 9:30 PM",
    },
    Fixture {
        id: "sim-mamma-maria",
        name: "Mamma Maria",
        address: "3 North Sq, Boston, MA",
        lat: 42.3639,
        lng: -71.0534,
        rating: 4.5,
        price_level: 4,
        tags: &["italian_restaurant", "fine_dining"],
        phone: "(617) 523-0077",
        website: "https://mammamaria.example.com",
        hours: "Open until 10 PM",
    },
    Fixture {
        id: "sim-santarpios",
        name: "Santarpio's Pizza",
        address: "111 Chelsea St, Boston, MA",
        lat: 42.3719,
        lng: -71.0367,
        rating: 4.4,
        price_level: 1,
        tags: &["pizza_restaurant"],
        phone: "(617) 567-9871",
        website: "https://santarpios.example.com",
        hours: "Open until 11 PM",
    },
    Fixture {
        id: "sim-toro",
        name: "Toro",
        address: "1704 Washington St, Boston, MA",
        lat: 42.3375,
        lng: -71.0754,
        rating: 4.4,
        price_level: 3,
        tags: &["spanish_restaurant", "tapas"],
        phone: "(617) 536-4300",
        website: "https://toro.example.com",
        hours: "Open until 11 PM",
    },
    Fixture {
        id: "sim-row34",
        name: "Row 34",
        address: "383 Congress St, Boston, MA",
        lat: 42.3504,
        lng: -71.0471,
        rating: 4.5,
        price_level: 3,
        tags: &["seafood_restaurant", "oyster_bar"],
        phone: "(617) 553-5900",
        website: "https://row34.example.com",
        hours: "Open until 10 PM",
    },
    Fixture {
        id: "sim-myers-chang",
        name: "Myers + Chang",
        address: "1145 Washington St, Boston, MA",
        lat: 42.3438,
        lng: -71.0654,
        rating: 4.3,
        price_level: 2,
        tags: &["asian_restaurant", "taiwanese"],
        phone: "(617) 542-5200",
        website: "https://myersandchang.example.com",
        hours: "Open until 9 PM",
    },
    Fixture {
        id: "sim-sarma",
        name: "Sarma",
        address: "249 Pearl St, Somerville, MA",
        lat: 42.3892,
        lng: -71.0907,
        rating: 4.7,
        price_level: 3,
        tags: &["mediterranean_restaurant", "meze"],
        phone: "(617) 764-4464",
        website: "https://sarma.example.com",
        hours: "Open until 10:30 PM",
    },
    Fixture {
        id: "sim-pammys",
        name: "Pammy's",
        address: "928 Massachusetts Ave, Cambridge, MA",
        lat: 42.3656,
        lng: -71.1040,
        rating: 4.5,
        price_level: 3,
        tags: &["italian_restaurant", "new_american"],
        phone: "(617) 945-1761",
        website: "https://pammys.example.com",
        hours: "Open until 10 PM",
    },
];

impl Fixture {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    #[must_use]
    pub fn entry(&self) -> ResultEntry {
        let mut entry = ResultEntry::new(self.id, self.name);
        entry.address = self.address.to_string();
        entry.coordinates = Some(self.coordinate());
        entry.rating = Some(self.rating);
        entry.price_level = Some(self.price_level);
        entry.category_tags = self.tags.iter().map(ToString::to_string).collect();
        entry.hours_summary = Some(self.hours.to_string());
        entry
    }

    #[must_use]
    pub fn detail(&self) -> DetailedResult {
        let mut detail = DetailedResult::from_entry(self.entry());
        detail.phone = Some(self.phone.to_string());
        detail.website = Some(self.website.to_string());
        detail.reviews = vec![Review {
            author: "Simulated diner".to_string(),
            rating: self.rating,
            text: format!("{} did not disappoint.", self.name),
        }];
        detail.serves_lunch = true;
        detail.serves_dinner = true;
        detail.serves_vegetarian = self.price_level < 4;
        detail
    }

    /// Builds the handoff form of this record. `with_coordinates = false`
    /// simulates an upstream screen that only knew the place id.
    #[must_use]
    pub fn preloaded(&self, with_coordinates: bool) -> PreloadedEntry {
        PreloadedEntry {
            place_id: self.id.to_string(),
            name: self.name.to_string(),
            address: Some(self.address.to_string()),
            latitude: with_coordinates.then_some(self.lat),
            longitude: with_coordinates.then_some(self.lng),
            rating: Some(self.rating),
            match_score: Some(self.rating / 5.0),
        }
    }
}

/// Looks a fixture up by place id.
#[must_use]
pub fn by_id(id: &str) -> Option<&'static Fixture> {
    ALL.iter().find(|fixture| fixture.id == id)
}
