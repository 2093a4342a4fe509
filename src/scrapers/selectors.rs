//! Role based lookups into listing pages.
//!
//! The extractor and walker ask for fields by [`Role`]; which CSS selector
//! answers a role lives only in this table, so markup changes on the site
//! are handled by editing the defaults (or the `selectors` config section).

use crate::error::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// One ad on a results page
    Listing,
    /// Results counter shown above the listings
    TotalListings,
    /// Pagination control leading to the next page
    NextPage,
    Title,
    /// "1 598 cm3 • 120 cv" line below the title
    Subtitle,
    Mileage,
    FuelType,
    Gearbox,
    Year,
    /// Combined price / rating container
    PriceBlock,
    PriceLink,
    PriceAmount,
    RatingIcon,
    RatingLabel,
}

impl Role {
    pub const ALL: [Role; 14] = [
        Role::Listing,
        Role::TotalListings,
        Role::NextPage,
        Role::Title,
        Role::Subtitle,
        Role::Mileage,
        Role::FuelType,
        Role::Gearbox,
        Role::Year,
        Role::PriceBlock,
        Role::PriceLink,
        Role::PriceAmount,
        Role::RatingIcon,
        Role::RatingLabel,
    ];

    /// Key used for the role in the `selectors` config section
    pub fn name(&self) -> &'static str {
        match self {
            Role::Listing => "listing",
            Role::TotalListings => "total_listings",
            Role::NextPage => "next_page",
            Role::Title => "title",
            Role::Subtitle => "subtitle",
            Role::Mileage => "mileage",
            Role::FuelType => "fuel_type",
            Role::Gearbox => "gearbox",
            Role::Year => "year",
            Role::PriceBlock => "price_block",
            Role::PriceLink => "price_link",
            Role::PriceAmount => "price_amount",
            Role::RatingIcon => "rating_icon",
            Role::RatingLabel => "rating_label",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.name() == name)
    }

    /// Selector matching the site's current markup.
    ///
    /// `PriceLink`, `PriceAmount`, `RatingIcon` and `RatingLabel` are
    /// resolved inside the `PriceBlock` element, everything else inside a
    /// listing or the whole page.
    pub fn default_selector(&self) -> &'static str {
        match self {
            Role::Listing => "section.ooa-qat6iw",
            Role::TotalListings => "p.e17gkxda2 b",
            Role::NextPage => r#"li[title="Next Page"]"#,
            Role::Title => "div.ooa-1qo9a0p h1 a",
            Role::Subtitle => "div.ooa-1qo9a0p p",
            Role::Mileage => r#"dd[data-parameter="mileage"]"#,
            Role::FuelType => r#"dd[data-parameter="fuel_type"]"#,
            Role::Gearbox => r#"dd[data-parameter="gearbox"]"#,
            Role::Year => r#"dd[data-parameter="first_registration_year"]"#,
            Role::PriceBlock => "div.ooa-2p9dfw",
            Role::PriceLink => "a[href]",
            Role::PriceAmount => "h3",
            Role::RatingIcon => "svg",
            Role::RatingLabel => "p",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compiled selector for every role
#[derive(Debug, Clone)]
pub struct SelectorTable {
    selectors: HashMap<Role, Selector>,
}

impl SelectorTable {
    /// Compile the defaults, replacing any role found in `overrides`.
    pub fn new(overrides: &BTreeMap<Role, String>) -> Result<Self, ConfigError> {
        let mut selectors = HashMap::new();
        for role in Role::ALL {
            let raw = overrides
                .get(&role)
                .map(String::as_str)
                .unwrap_or_else(|| role.default_selector());
            let selector = Selector::parse(raw).map_err(|e| ConfigError::Selector {
                role: role.to_string(),
                selector: raw.to_string(),
                reason: e.to_string(),
            })?;
            selectors.insert(role, selector);
        }
        Ok(Self { selectors })
    }

    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(&BTreeMap::new())
    }

    fn get(&self, role: Role) -> &Selector {
        // every role is inserted in new()
        &self.selectors[&role]
    }
}

/// An element located by role, able to look up further roles inside itself.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    element: ElementRef<'a>,
    table: &'a SelectorTable,
}

impl<'a> Field<'a> {
    pub fn new(element: ElementRef<'a>, table: &'a SelectorTable) -> Self {
        Self { element, table }
    }

    /// First element matching `role` below this one.
    pub fn find(&self, role: Role) -> Option<Field<'a>> {
        self.element
            .select(self.table.get(role))
            .next()
            .map(|element| Field::new(element, self.table))
    }

    pub fn find_all(&self, role: Role) -> Vec<Field<'a>> {
        self.element
            .select(self.table.get(role))
            .map(|element| Field::new(element, self.table))
            .collect()
    }

    /// All text below the element, trimmed.
    pub fn text(&self) -> String {
        self.element.text().collect::<String>().trim().to_string()
    }

    /// First non-blank text node, trimmed.
    pub fn first_text(&self) -> Option<String> {
        self.element
            .text()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }
}

/// State of the "next page" control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    Missing,
    Disabled,
    Enabled,
}

/// A fetched results page
pub struct PageView<'a> {
    root: Field<'a>,
}

impl<'a> PageView<'a> {
    pub fn new(document: &'a Html, table: &'a SelectorTable) -> Self {
        Self {
            root: Field::new(document.root_element(), table),
        }
    }

    /// Listing containers in document order
    pub fn listings(&self) -> Vec<Field<'a>> {
        self.root.find_all(Role::Listing)
    }

    pub fn total_listings(&self) -> Option<String> {
        self.root.find(Role::TotalListings).and_then(|f| f.first_text())
    }

    pub fn next_page(&self) -> NextPage {
        match self.root.find(Role::NextPage) {
            None => NextPage::Missing,
            Some(control) if is_disabled(&control) => NextPage::Disabled,
            Some(_) => NextPage::Enabled,
        }
    }
}

fn is_disabled(control: &Field<'_>) -> bool {
    control.attr("aria-disabled") == Some("true") || control.attr("disabled").is_some()
}
