use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use zurich_core::control::{
    Business, BusinessResults, BusinessSearch, Mandate, Member, MemberResults, MemberSearch,
};

use crate::{ZurichMcp, helpers};

const FIRST_YEAR: u32 = 1990;
const LAST_YEAR: u32 = 2030;

/// Parameters for the council business search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ParliamentSearchParams {
    /// Term searched in the business title, e.g. `Schule`, `Klimaschutz`.
    pub query: String,
    /// Only business from this year on (1990 to 2030).
    pub year_from: Option<u32>,
    /// Only business up to and including this year (1990 to 2030).
    pub year_to: Option<u32>,
    /// Lead department, e.g. `Schul- und Sportdepartement`.
    pub department: Option<String>,
    /// Maximum number of results, 1 to 50 (default 10).
    pub max_results: Option<u32>,
}

/// Parameters for the council member search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ParliamentMembersParams {
    /// Name or part of a name, e.g. `Marti`.
    pub name: Option<String>,
    /// Party, e.g. `SP`, `SVP`, `Grüne`, `FDP`, `GLP`, `AL`, `Mitte`.
    pub party: Option<String>,
    /// Commission, e.g. `GPK`, `RPK`. Lists the members of that commission.
    pub commission: Option<String>,
    /// Only active members (default true).
    pub active_only: Option<bool>,
    /// Maximum number of results, 1 to 100 (default 20).
    pub max_results: Option<u32>,
}

#[tool_router(router = tool_router_parliament, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "Search the business of the municipal council (motions, postulates, interpellations).")]
    async fn zurich_parliament_search(
        &self,
        Parameters(params): Parameters<ParliamentSearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::required(&params.query, "query", 1)?;
        let query = helpers::at_most(query, "query", 500)?;
        let year = |year: Option<u32>| year.map(|year| year.clamp(FIRST_YEAR, LAST_YEAR));
        let search = BusinessSearch::new(query, helpers::clamp(params.max_results, 10, 1, 50))
            .with_years(year(params.year_from), year(params.year_to))
            .with_department(helpers::optional(params.department));
        let result = self.control.search_business(&search).await;
        Ok(helpers::respond(result, "Geschäftssuche Gemeinderat", |results| {
            render_business(&search.query, &results)
        }))
    }

    #[tool(description = "Search members of the municipal council by name, party or commission.")]
    async fn zurich_parliament_members(
        &self,
        Parameters(params): Parameters<ParliamentMembersParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let search = MemberSearch::new(helpers::clamp(params.max_results, 20, 1, 100))
            .with_name(helpers::optional(params.name))
            .with_party(helpers::optional(params.party))
            .with_commission(helpers::optional(params.commission))
            .with_active_only(params.active_only.unwrap_or(true));
        let result = self.control.search_members(&search).await;
        Ok(helpers::respond(result, "Mitgliedersuche Gemeinderat", |results| {
            render_members(&results)
        }))
    }
}

fn business_entry(business: &Business) -> Vec<String> {
    let mut lines = vec![
        format!("### {}: {}", business.number, business.title),
        format!("- **Art**: {}", business.kind),
        format!("- **Status**: {}", business.status),
        format!("- **Datum**: {}", business.date),
    ];
    if !business.department.is_empty() {
        lines.push(format!("- **Departement**: {}", business.department));
    }
    if !business.submitter.is_empty() {
        lines.push(format!("- **Eingereicht von**: {}", business.submitter));
    }
    lines.push(format!("- **Link**: {}", business.link()));
    lines.push(String::new());
    lines
}

fn render_business(query: &str, results: &BusinessResults) -> String {
    if results.returned == 0 {
        return format!("Keine Gemeinderatsgeschäfte gefunden für '{query}'.");
    }
    let mut lines = vec![
        format!("## Gemeinderatsgeschäfte: '{query}'"),
        format!(
            "**{} Treffer** (zeige {})\n",
            results.total, results.returned
        ),
    ];
    lines.extend(results.items.iter().flat_map(business_entry));
    let returned = results.returned as u64;
    if results.total > returned {
        lines.push(format!(
            "*→ {} weitere Treffer vorhanden*",
            results.total - returned
        ));
    }
    lines.join("\n")
}

fn mandate_line(mandate: &Mandate) -> String {
    let mut line = format!("- **{}**", mandate.display_name());
    if !mandate.party.is_empty() {
        line.push_str(&format!(" ({})", mandate.party));
    }
    line.push_str(&format!(" – {}, {}", mandate.function, mandate.body));
    if let Some(since) = mandate.since() {
        line.push_str(&format!(" (seit {since})"));
    }
    line
}

fn member_entry(member: &Member) -> String {
    let mut entry = format!("- **{}**", member.name);
    if !member.party.is_empty() {
        entry.push_str(&format!(" ({})", member.party));
    }
    if !member.district.is_empty() {
        entry.push_str(&format!(" – Wahlkreis {}", member.district));
    }
    if !member.mandates.is_empty() {
        let mandates: Vec<String> = member
            .mandates
            .iter()
            .map(|(body, function)| {
                if function.is_empty() {
                    body.clone()
                } else {
                    format!("{body} ({function})")
                }
            })
            .collect();
        entry.push_str(&format!("\n  - Mandate: {}", mandates.join(", ")));
    }
    entry
}

fn render_members(results: &MemberResults) -> String {
    match results {
        MemberResults::Commission {
            commission,
            total,
            mandates,
        } => {
            if mandates.is_empty() {
                return format!("Keine Mitglieder gefunden für Kommission '{commission}'.");
            }
            let mut lines = vec![
                format!("## Kommission: {commission}"),
                format!("**{total} Mitglieder**\n"),
            ];
            lines.extend(mandates.iter().map(mandate_line));
            lines.join("\n")
        }
        MemberResults::Council {
            total,
            members,
            returned,
        } => {
            if *returned == 0 {
                return "Keine Ratsmitglieder gefunden.".to_string();
            }
            let mut lines = vec![
                "## Gemeinderatsmitglieder".to_string(),
                format!("**{total} Treffer** (zeige {returned})\n"),
            ];
            for member in members {
                lines.push(member_entry(member));
                lines.push(String::new());
            }
            lines.join("\n")
        }
    }
}
