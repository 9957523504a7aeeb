//! Account, user and quota commands.

use breeze_api::model::{PrincipalListItem, Quota, QuotaLimit, UserInfo};
use breeze_api::{BreezeClient, Filter};
use serde::Serialize;

use super::{table, take, to_json};
use crate::error::CliResult;

#[derive(Serialize)]
struct Whoami<'a> {
    #[serde(flatten)]
    user: &'a UserInfo,
    is_admin: bool,
}

/// The logged-in user and whether they administer the account.
pub fn whoami(client: &BreezeClient, json: bool) -> CliResult<String> {
    let user = take("common-info", client.user_info())?;
    let is_admin = client.is_admin(&user.user_id);

    if json {
        return to_json(&Whoami {
            user: &user,
            is_admin,
        });
    }
    let mut line = format!(
        "{} <{}> (id {})",
        user.name.as_deref().unwrap_or("-"),
        user.login.as_deref().unwrap_or("-"),
        user.user_id
    );
    if is_admin {
        line.push_str(" [admin]");
    }
    Ok(line)
}

pub fn quotas(client: &BreezeClient, json: bool) -> CliResult<String> {
    let quotas = take("report-quotas", client.quotas())?;
    if json {
        return to_json(&quotas);
    }
    Ok(render_quotas(&quotas))
}

/// Users and groups, optionally the members of one group.
pub fn principals(client: &BreezeClient, group: Option<&str>, json: bool) -> CliResult<String> {
    let principals = take("principal-list", client.principal_list(group, Filter::new()))?;
    if json {
        return to_json(&principals);
    }
    Ok(render_principals(&principals))
}

fn render_quotas(quotas: &[Quota]) -> String {
    let limit = |limit: &Option<QuotaLimit>| match limit {
        Some(QuotaLimit::Unlimited) => "unlimited".to_string(),
        Some(QuotaLimit::Limited(n)) => n.to_string(),
        None => "-".to_string(),
    };
    let rows: Vec<Vec<String>> = quotas
        .iter()
        .map(|q| {
            vec![
                q.quota_id.clone(),
                q.used.map_or_else(|| "-".to_string(), |n| n.to_string()),
                limit(&q.limit),
                limit(&q.soft_limit),
            ]
        })
        .collect();
    table(&["QUOTA", "USED", "LIMIT", "SOFT"], &rows)
}

fn render_principals(principals: &[PrincipalListItem]) -> String {
    let rows: Vec<Vec<String>> = principals
        .iter()
        .map(|p| {
            vec![
                p.principal_id.clone(),
                p.name.clone().unwrap_or_default(),
                p.login.clone().unwrap_or_default(),
                if p.has_children { "group" } else { "user" }.to_string(),
            ]
        })
        .collect();
    table(&["ID", "NAME", "LOGIN", "KIND"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::canned::{client, ok};
    use crate::commands::session::with_session;

    #[test]
    fn whoami_marks_administrators() {
        let (client, canned) = client(&[
            &ok(""),
            &ok(r#"<common><user user-id="42"><name>Pat Lee</name><login>pat@example.com</login></user></common>"#),
            &ok(r#"<principal-list><principal principal-id="500" type="admins"/></principal-list>"#),
            &ok(r#"<principal-list><principal principal-id="42"/></principal-list>"#),
            &ok(""),
        ]);
        let line = with_session(&client, |c| whoami(c, false)).unwrap();
        assert_eq!(line, "Pat Lee <pat@example.com> (id 42) [admin]");
        assert_eq!(
            canned.actions(),
            ["login", "common-info", "principal-list", "principal-list", "logout"]
        );
    }

    #[test]
    fn whoami_json_flattens_user() {
        let (client, _) = client(&[
            &ok(""),
            &ok(r#"<common><user user-id="42"><login>pat</login></user></common>"#),
            r#"<results><status code="no-data"/></results>"#,
            &ok(""),
        ]);
        let out = with_session(&client, |c| whoami(c, true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["user_id"], "42");
        assert_eq!(value["is_admin"], false);
    }

    #[test]
    fn quota_table() {
        let quotas = vec![
            Quota {
                quota_id: "download-quota".into(),
                used: Some(0),
                limit: Some(QuotaLimit::Limited(5)),
                ..Quota::default()
            },
            Quota {
                quota_id: "num-of-members-quota".into(),
                used: Some(2),
                limit: Some(QuotaLimit::Unlimited),
                ..Quota::default()
            },
        ];
        let rendered = render_quotas(&quotas);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "QUOTA                 USED  LIMIT      SOFT");
        assert_eq!(lines[1], "download-quota        0     5          -");
        assert_eq!(lines[2], "num-of-members-quota  2     unlimited  -");
    }

    #[test]
    fn principals_for_a_group() {
        let (client, _) = client(&[
            &ok(""),
            &ok(r#"<principal-list>
                     <principal principal-id="1" has-children="true"><name>Hosts</name></principal>
                     <principal principal-id="2" has-children="false"><name>Pat</name><login>pat</login></principal>
                   </principal-list>"#),
            &ok(""),
        ]);
        let out = with_session(&client, |c| principals(c, Some("77"), false)).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("group"));
        assert!(lines[2].contains("pat"));
    }
}
