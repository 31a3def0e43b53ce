//! # Client Commands

use std::fmt::Write as _;

use serde::Serialize;

use crate::commands::Report;
use crate::error::CliResult;
use crate::state::{ConfigState, FloorState};
use lanhouse_core::loyalty::redeemable_hours;
use lanhouse_core::Client;

/// Rows returned by a search.
const SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRow {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub points: i64,
    pub redeemable_hours: i64,
}

impl From<Client> for ClientRow {
    fn from(client: Client) -> Self {
        ClientRow {
            redeemable_hours: redeemable_hours(client.points),
            id: client.id,
            name: client.name,
            phone: client.phone,
            points: client.points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientsReport {
    pub clients: Vec<ClientRow>,
}

/// Every client, or those whose name or phone matches `query`.
pub async fn list(floor: &FloorState, query: Option<&str>) -> CliResult<ClientsReport> {
    let clients: Vec<Client> = match query {
        Some(q) if !q.trim().is_empty() => floor.db().clients().search(q, SEARCH_LIMIT).await?,
        _ => floor.clients().clients().cloned().collect(),
    };

    Ok(ClientsReport {
        clients: clients.into_iter().map(ClientRow::from).collect(),
    })
}

impl Report for ClientsReport {
    fn render(&self, _config: &ConfigState) -> String {
        if self.clients.is_empty() {
            return "No clients\n".to_string();
        }

        let mut out = String::new();
        for c in &self.clients {
            let _ = writeln!(
                out,
                "{:<10} {:<22} {:<12} {:>5} pts  ({}h free)",
                c.id,
                c.name,
                c.phone.as_deref().unwrap_or("-"),
                c.points,
                c.redeemable_hours
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::{config, seeded_floor};

    #[tokio::test]
    async fn test_list_and_search() {
        let floor = seeded_floor().await;

        let all = list(&floor, None).await.unwrap();
        assert_eq!(all.clients.len(), 1);
        assert_eq!(all.clients[0].points, 25);
        assert_eq!(all.clients[0].redeemable_hours, 2);
        assert!(all.render(&config()).contains("Ana Torres"));

        let hit = list(&floor, Some("torr")).await.unwrap();
        assert_eq!(hit.clients.len(), 1);

        let miss = list(&floor, Some("zzz")).await.unwrap();
        assert!(miss.clients.is_empty());
        assert_eq!(miss.render(&config()), "No clients\n");
    }
}
