//! Meeting listings.

use breeze_api::BreezeClient;
use breeze_api::model::MeetingItem;

use super::{table, take, to_json};
use crate::error::CliResult;

/// Every meeting on the account, or only the caller's with `mine`.
pub fn list(client: &BreezeClient, like: Option<&str>, mine: bool, json: bool) -> CliResult<String> {
    let meetings = if mine {
        take("report-my-meetings", client.my_meetings(like))?
    } else {
        take("report-bulk-objects", client.all_meetings(like))?
    };
    if json {
        return to_json(&meetings);
    }
    Ok(render(&meetings))
}

/// What a folder or meeting room holds.
pub fn contents(client: &BreezeClient, sco_id: &str, json: bool) -> CliResult<String> {
    let items = take("sco-contents", client.meetings_in_room(sco_id))?;
    if json {
        return to_json(&items);
    }
    Ok(render(&items))
}

fn render(items: &[MeetingItem]) -> String {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|m| {
            vec![
                m.sco_id.clone(),
                m.sco_type.map(|t| t.to_string()).unwrap_or_default(),
                m.name.clone().unwrap_or_default(),
                m.dates
                    .begin
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
                m.duration.num_minutes().to_string(),
                m.full_url.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(&["ID", "TYPE", "NAME", "BEGIN", "MIN", "URL"], &rows)
}
