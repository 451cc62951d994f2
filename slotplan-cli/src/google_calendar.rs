use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use google_calendar3::api::{Event, EventDateTime};
use google_calendar3::{oauth2, CalendarHub};
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;
use serde::{Deserialize, Serialize};
use slotplan_ingest::{RawEvent, RawEventTime};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::calendar::CalendarEvent;
use crate::state::{ensure_slotplan_home, prompt_line, read_json, write_json};

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "http://localhost";
const CLIENT_ID_SUFFIX: &str = ".apps.googleusercontent.com";

type Hub = CalendarHub<HttpsConnector<HttpConnector>>;

/// A "Desktop app" OAuth client, stored in `~/.slotplan/google_client.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopClient {
    pub client_id: String,
    pub client_secret: String,
}

impl DesktopClient {
    fn check(&self) -> Result<()> {
        if !self.client_id.ends_with(CLIENT_ID_SUFFIX) {
            bail!("client_id should end with {CLIENT_ID_SUFFIX}");
        }
        if self.client_secret.len() < 10 {
            bail!("client_secret is too short");
        }
        Ok(())
    }

    fn secret(&self) -> oauth2::ApplicationSecret {
        oauth2::ApplicationSecret {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: AUTH_URI.to_string(),
            token_uri: TOKEN_URI.to_string(),
            redirect_uris: vec![REDIRECT_URI.to_string()],
            ..Default::default()
        }
    }
}

fn client_path() -> Result<PathBuf> {
    Ok(ensure_slotplan_home()?.join("google_client.json"))
}

fn token_path() -> Result<PathBuf> {
    Ok(ensure_slotplan_home()?.join("google_tokens.json"))
}

fn load_client() -> Result<DesktopClient> {
    let path = client_path()?;
    read_json(&path)?.with_context(|| {
        format!("no Google client at {}; run: slotplan calendar connect", path.display())
    })
}

async fn open_hub(client: &DesktopClient) -> Result<Hub> {
    let auth = oauth2::InstalledFlowAuthenticator::builder(
        client.secret(),
        oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_path()?)
    .build()
    .await
    .context("building Google authenticator")?;

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Ok(CalendarHub::new(hyper::Client::builder().build(connector), auth))
}

/// Store a Desktop OAuth client and authorize it in the browser.
pub async fn connect_interactive() -> Result<()> {
    println!("Create a Desktop app OAuth client at");
    println!("https://console.cloud.google.com/apis/credentials and paste its credentials.\n");

    let client = DesktopClient {
        client_id: prompt_line("client_id")?,
        client_secret: prompt_line("client_secret")?,
    };
    client.check()?;
    write_json(&client_path()?, &client)?;

    // first authorized request opens the consent page
    let hub = open_hub(&client).await?;
    let (_, calendars) = hub
        .calendar_list()
        .list()
        .max_results(1)
        .doit()
        .await
        .context("authorizing calendar access")?;
    info!(
        visible = calendars.items.map_or(0, |c| c.len()),
        "calendar access granted"
    );

    println!("Connected. Tokens are kept in {}", token_path()?.display());
    Ok(())
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("unknown timezone '{name}': {e}"))
}

fn local_to_utc(tz: Tz, local: NaiveDateTime) -> Result<DateTime<Utc>> {
    let zoned = tz
        .from_local_datetime(&local)
        .earliest()
        .with_context(|| format!("{local} does not exist in {tz}"))?;
    Ok(zoned.with_timezone(&Utc))
}

/// Insert planner blocks, interpreting their wall-clock times in `tz`.
pub async fn push_events(calendar_id: &str, tz: Tz, events: &[CalendarEvent]) -> Result<()> {
    let hub = open_hub(&load_client()?).await?;

    for e in events {
        let mut ev = Event::default();
        ev.summary = Some(e.summary.clone());
        ev.description = Some(e.description.clone());
        ev.start = Some(EventDateTime {
            date_time: Some(local_to_utc(tz, e.start_local)?),
            time_zone: Some(tz.name().to_string()),
            ..Default::default()
        });
        ev.end = Some(EventDateTime {
            date_time: Some(local_to_utc(tz, e.end_local)?),
            time_zone: Some(tz.name().to_string()),
            ..Default::default()
        });

        hub.events()
            .insert(ev, calendar_id)
            .doit()
            .await
            .with_context(|| format!("inserting event '{}'", e.summary))?;
        debug!(uid = %e.uid, "event inserted");
    }

    Ok(())
}

fn to_raw_time(t: Option<&EventDateTime>, tz: Tz) -> RawEventTime {
    let Some(t) = t else {
        return RawEventTime::default();
    };
    RawEventTime {
        date_time: t
            .date_time
            .map(|dt| dt.with_timezone(&tz).naive_local().format("%Y-%m-%dT%H:%M:%S").to_string()),
        date: t.date.map(|d| d.format("%Y-%m-%d").to_string()),
    }
}

/// Fetch events from `from` through `from + days` and express them in `tz`.
pub async fn pull_events(
    calendar_ids: &[String],
    tz: Tz,
    from: NaiveDate,
    days: u64,
) -> Result<Vec<RawEvent>> {
    if calendar_ids.is_empty() {
        bail!("no calendars configured; set [calendar] calendar_ids in config.toml");
    }
    let hub = open_hub(&load_client()?).await?;

    let until = from
        .checked_add_days(Days::new(days + 1))
        .context("pull window out of range")?;
    let time_min = local_to_utc(tz, from.and_time(chrono::NaiveTime::MIN))?;
    let time_max = local_to_utc(tz, until.and_time(chrono::NaiveTime::MIN))?;

    let mut out = Vec::new();
    for cal in calendar_ids {
        let result = hub
            .events()
            .list(cal)
            .time_min(time_min)
            .time_max(time_max)
            .single_events(true)
            .order_by("startTime")
            .doit()
            .await;

        let events = match result {
            Ok((_, events)) => events,
            Err(e) => {
                warn!(calendar = %cal, error = %e, "calendar pull failed");
                continue;
            }
        };

        for ev in events.items.unwrap_or_default() {
            out.push(RawEvent {
                summary: ev.summary,
                start: to_raw_time(ev.start.as_ref(), tz),
                end: to_raw_time(ev.end.as_ref(), tz),
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_client_fills_installed_secret() {
        let client = DesktopClient {
            client_id: "1234-abc.apps.googleusercontent.com".into(),
            client_secret: "GOCSPX-secret-value".into(),
        };
        assert!(client.check().is_ok());

        let secret = client.secret();
        assert_eq!(secret.client_id, client.client_id);
        assert_eq!(secret.token_uri, TOKEN_URI);
        assert_eq!(secret.redirect_uris, vec![REDIRECT_URI.to_string()]);

        let bad = DesktopClient {
            client_id: "not-a-client".into(),
            ..client
        };
        assert!(bad.check().is_err());
    }

    #[test]
    fn utc_instants_become_local_wall_clock() {
        let tz = parse_timezone("Europe/Paris").unwrap();
        let start = EventDateTime {
            date_time: Some(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()),
            ..Default::default()
        };
        let raw = to_raw_time(Some(&start), tz);
        assert_eq!(raw.date_time.as_deref(), Some("2026-03-02T09:00:00"));
        assert_eq!(raw.date, None);

        let local = NaiveDate::from_ymd_opt(2026, 7, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            local_to_utc(tz, local).unwrap(),
            Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap()
        );
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
