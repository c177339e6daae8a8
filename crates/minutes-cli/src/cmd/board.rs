use crate::output::{print_json, print_table};
use anyhow::Context;
use minutes_client::{BoardApi, HttpBoardApi};
use minutes_core::card::Card;
use minutes_core::types::CardStatus;

pub async fn run(url: &str, token: &str, json: bool) -> anyhow::Result<()> {
    let api = HttpBoardApi::new(url, token)?;
    let board = api.fetch_board().await.context("could not fetch board")?;

    if json {
        return print_json(&board);
    }

    let mut rows = Vec::new();
    for status in CardStatus::all() {
        for card in board.column(*status) {
            rows.push(row(card));
        }
    }
    if rows.is_empty() {
        println!("The board is empty.");
        return Ok(());
    }
    print_table(&["COLUMN", "POS", "TITLE", "PRIORITY", "DUE", "ID"], &rows);
    Ok(())
}

fn row(card: &Card) -> Vec<String> {
    vec![
        card.status.to_string(),
        card.position.to_string(),
        card.title.clone(),
        card.priority.to_string(),
        card.due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        card.id.to_string(),
    ]
}
