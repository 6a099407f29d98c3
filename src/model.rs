//! User records as served by the remote API.
//!
//! Records are read-only from the application's point of view: they are
//! created when a fetch resolves and dropped with the cache entry that holds
//! them.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

impl User {
    /// `mailto:` link for the "Send Email" action.
    pub fn mailto_link(&self) -> String {
        format!("mailto:{}", self.email)
    }

    /// Link for the "Visit Website" action. The API serves bare host names.
    pub fn website_link(&self) -> String {
        let site = self.website.trim();
        if has_scheme(site, "http://") || has_scheme(site, "https://") {
            site.to_string()
        } else {
            format!("http://{site}")
        }
    }

    pub fn street_line(&self) -> String {
        format!("{}, {}", self.address.street, self.address.suite)
    }

    pub fn coordinates(&self) -> String {
        format!("{}, {}", self.address.geo.lat, self.address.geo.lng)
    }
}

fn has_scheme(link: &str, scheme: &str) -> bool {
    link.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}
