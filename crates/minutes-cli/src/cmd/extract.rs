use crate::output::{print_json, print_table};
use anyhow::bail;
use minutes_client::{ExtractionFlow, HttpBoardApi, ReviewState};
use uuid::Uuid;

pub async fn run(url: &str, token: &str, note: Uuid, yes: bool, json: bool) -> anyhow::Result<()> {
    let api = HttpBoardApi::new(url, token)?;
    let mut flow = ExtractionFlow::new();
    flow.start(&api, note).await;

    match flow.state() {
        ReviewState::Reviewing => {}
        ReviewState::Empty { message } => {
            println!("{message}");
            return Ok(());
        }
        ReviewState::Failed { message, .. } => bail!("extraction failed: {message}"),
        state => bail!("unexpected extraction state: {state:?}"),
    }

    if json {
        print_json(&flow.candidates())?;
    } else {
        let rows: Vec<Vec<String>> = flow
            .candidates()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                vec![
                    i.to_string(),
                    c.title.clone(),
                    c.priority.to_string(),
                    c.due_date.clone().unwrap_or_default(),
                ]
            })
            .collect();
        print_table(&["#", "TITLE", "PRIORITY", "DUE"], &rows);
    }

    if !yes {
        println!(
            "\nFound {} proposed item(s). Re-run with --yes to save them all as cards.",
            flow.candidates().len()
        );
        return Ok(());
    }

    let created = flow.save(&api).await?;
    println!("Created {created} card(s) in todo.");
    Ok(())
}
