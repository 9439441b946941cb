//! Council business and member searches on the records service.
//!
//! CQL expressions are assembled here from typed search options; hits are
//! decoded into plain records with fixed fallbacks for missing elements.

use zurich_model::registry::namespaces::{BUSINESS, CONTACT, MANDATE};

use super::{ControlError, OpenDataControlPlane};
use crate::adapters::{RecordsQuery, extract_text, hit_count, hits};
use crate::xml::XmlElement;

pub const BUSINESS_INDEX: &str = "geschaeft";
pub const MANDATE_INDEX: &str = "behoerdenmandat";
pub const CONTACT_INDEX: &str = "kontakt";
pub const BUSINESS_LINK_BASE: &str = "https://www.gemeinderat-zuerich.ch/geschaefte";
const SORT_NEWEST: &str = " sortBy beginn_start/sort.descending";
const ACTIVE_MANDATE: &str = r#"Dauer_end > "9999-12-31 00:00:00""#;
const ACTIVE_MEMBER: &str = r#"AktivesRatsmitglied = "true""#;
/// Mandates listed per member.
pub const MAX_MEMBER_MANDATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessSearch {
    pub query: String,
    pub year_from: Option<u32>,
    pub year_to: Option<u32>,
    pub department: Option<String>,
    pub max_results: u32,
}

impl BusinessSearch {
    #[must_use]
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            year_from: None,
            year_to: None,
            department: None,
            max_results,
        }
    }

    #[must_use]
    pub const fn with_years(mut self, from: Option<u32>, to: Option<u32>) -> Self {
        self.year_from = from;
        self.year_to = to;
        self
    }

    #[must_use]
    pub fn with_department(mut self, department: Option<String>) -> Self {
        self.department = department;
        self
    }

    /// Title search, optionally bounded by start year and department,
    /// newest first. `year_to` is inclusive.
    #[must_use]
    pub fn cql(&self) -> String {
        let mut parts = vec![format!(r#"Titel any "{}""#, self.query)];
        if let Some(from) = self.year_from {
            parts.push(format!(r#"beginn_start > "{from}-01-01 00:00:00""#));
        }
        if let Some(to) = self.year_to {
            parts.push(format!(r#"beginn_start < "{}-01-01 00:00:00""#, to + 1));
        }
        if let Some(department) = &self.department {
            parts.push(format!(r#"Departement any "{department}""#));
        }
        parts.join(" AND ") + SORT_NEWEST
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSearch {
    pub name: Option<String>,
    pub party: Option<String>,
    pub commission: Option<String>,
    pub active_only: bool,
    pub max_results: u32,
}

impl MemberSearch {
    #[must_use]
    pub const fn new(max_results: u32) -> Self {
        Self {
            name: None,
            party: None,
            commission: None,
            active_only: true,
            max_results,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    #[must_use]
    pub fn with_party(mut self, party: Option<String>) -> Self {
        self.party = party;
        self
    }

    #[must_use]
    pub fn with_commission(mut self, commission: Option<String>) -> Self {
        self.commission = commission;
        self
    }

    #[must_use]
    pub const fn with_active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    /// Index and CQL expression for this search.
    ///
    /// A commission searches the mandate index and ignores the party. Without
    /// one the contact index is used; a search with no criterion at all
    /// lists the active council members.
    #[must_use]
    pub fn index_and_cql(&self) -> (&'static str, String) {
        let mut parts = Vec::new();
        if let Some(commission) = &self.commission {
            parts.push(format!(r#"gremium any "{commission}""#));
            if self.active_only {
                parts.push(ACTIVE_MANDATE.to_string());
            }
            if let Some(name) = &self.name {
                parts.push(format!(r#"Name any "{name}""#));
            }
            return (MANDATE_INDEX, parts.join(" AND "));
        }

        if let Some(name) = &self.name {
            parts.push(format!(r#"NameVorname any "{name}""#));
        }
        if let Some(party) = &self.party {
            parts.push(format!(r#"Partei any "{party}""#));
        }
        if self.active_only || parts.is_empty() {
            parts.push(ACTIVE_MEMBER.to_string());
        }
        (CONTACT_INDEX, parts.join(" AND "))
    }
}

/// One council business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Business {
    pub number: String,
    pub title: String,
    pub kind: String,
    pub status: String,
    /// Lead department; empty when not assigned.
    pub department: String,
    pub date: String,
    /// First signatory with party, empty when unknown.
    pub submitter: String,
}

impl Business {
    fn from_hit(hit: &XmlElement) -> Option<Self> {
        let business = hit.find(BUSINESS, "Geschaeft")?;
        let text = |path: &[&str], default: &str| {
            let steps: Vec<(&str, &str)> = path.iter().map(|name| (BUSINESS, *name)).collect();
            extract_text(business.find_path(&steps), default)
        };
        let submitter = business
            .find_path(&[(BUSINESS, "Erstunterzeichner"), (BUSINESS, "KontaktGremium")])
            .map(|signatory| {
                let name = extract_text(signatory.find(BUSINESS, "Name"), "");
                let party = extract_text(signatory.find(BUSINESS, "Partei"), "");
                if party.is_empty() {
                    name
                } else {
                    format!("{name} ({party})")
                }
            })
            .unwrap_or_default();

        Some(Self {
            number: text(&["GRNr"], "?"),
            title: text(&["Titel"], "Ohne Titel"),
            kind: text(&["Geschaeftsart"], "?"),
            status: text(&["Geschaeftsstatus"], "?"),
            department: text(&["FederfuehrendesDepartement", "Departement", "Name"], ""),
            date: text(&["Beginn", "Text"], "?"),
            submitter,
        })
    }

    /// Public page of the business; slashes in the number become dashes.
    #[must_use]
    pub fn link(&self) -> String {
        format!("{BUSINESS_LINK_BASE}/{}", self.number.replace('/', "-"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessResults {
    pub total: u64,
    pub items: Vec<Business>,
    /// Number of `Hit` elements returned, including undecodable ones.
    pub returned: usize,
}

/// A seat in a council body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mandate {
    pub name: String,
    pub first_name: String,
    pub body: String,
    pub function: String,
    pub party: String,
    pub term: String,
}

impl Mandate {
    fn from_hit(hit: &XmlElement) -> Option<Self> {
        let mandate = hit.find(MANDATE, "Behoerdenmandat")?;
        let text = |name: &str, default: &str| extract_text(mandate.find(MANDATE, name), default);
        Some(Self {
            name: text("Name", "?"),
            first_name: text("Vorname", ""),
            body: text("Gremium", "?"),
            function: text("Funktion", "Mitglied"),
            party: text("Partei", ""),
            term: extract_text(
                mandate.find_path(&[(MANDATE, "Dauer"), (MANDATE, "Text")]),
                "?",
            ),
        })
    }

    /// Start of the term when it is given as a `start - end` range.
    #[must_use]
    pub fn since(&self) -> Option<&str> {
        self.term
            .split_once(" -")
            .map(|(start, _)| start.trim())
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.first_name, self.name)
        }
    }
}

/// A council member from the contact index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub party: String,
    pub district: String,
    /// Bodies with the member's function, at most [`MAX_MEMBER_MANDATES`].
    pub mandates: Vec<(String, String)>,
}

impl Member {
    fn from_hit(hit: &XmlElement) -> Option<Self> {
        let contact = hit.find(CONTACT, "Kontakt")?;
        let text = |name: &str, default: &str| extract_text(contact.find(CONTACT, name), default);
        let mandates = contact
            .find_all_path(&[(CONTACT, "Behoerdenmandat"), (CONTACT, "Behoerdenmandat")])
            .into_iter()
            .take(MAX_MEMBER_MANDATES)
            .map(|mandate| {
                (
                    extract_text(mandate.find(CONTACT, "GremiumName"), "?"),
                    extract_text(mandate.find(CONTACT, "Funktion"), ""),
                )
            })
            .collect();
        Some(Self {
            name: text("NameVorname", "?"),
            party: text("Partei", ""),
            district: text("Wahlkreis", ""),
            mandates,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberResults {
    Commission {
        commission: String,
        total: u64,
        mandates: Vec<Mandate>,
    },
    Council {
        total: u64,
        members: Vec<Member>,
        returned: usize,
    },
}

impl OpenDataControlPlane {
    /// Searches council business by title.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the records request fails or the
    /// response is not well-formed XML.
    pub async fn search_business(
        &self,
        search: &BusinessSearch,
    ) -> Result<BusinessResults, ControlError> {
        let query = RecordsQuery::new(BUSINESS_INDEX, search.cql())
            .with_max_results(search.max_results);
        let root = self.records.search(&query).await?;
        Ok(BusinessResults {
            total: hit_count(&root),
            items: hits(&root).filter_map(Business::from_hit).collect(),
            returned: hits(&root).count(),
        })
    }

    /// Searches council members, or the members of one commission.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the records request fails or the
    /// response is not well-formed XML.
    pub async fn search_members(
        &self,
        search: &MemberSearch,
    ) -> Result<MemberResults, ControlError> {
        let (index, cql) = search.index_and_cql();
        let query = RecordsQuery::new(index, cql).with_max_results(search.max_results);
        let root = self.records.search(&query).await?;
        let total = hit_count(&root);

        Ok(match &search.commission {
            Some(commission) => MemberResults::Commission {
                commission: commission.clone(),
                total,
                mandates: hits(&root).filter_map(Mandate::from_hit).collect(),
            },
            None => MemberResults::Council {
                total,
                members: hits(&root).filter_map(Member::from_hit).collect(),
                returned: hits(&root).count(),
            },
        })
    }
}
