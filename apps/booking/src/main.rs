use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use clap::Parser;
use client_core::{BookingClient, Route, SchedulingApi, SchedulingController, ScreenEvent};
use shared::{
    domain::{Platform, ProviderId},
    protocol::RouteParams,
    schedule::{same_time_on, HourSlot},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser, Debug)]
#[command(about = "Pick a provider, a day and an hour, and book it")]
struct Args {
    /// Overrides `api_url` from booking.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    provider_id: String,
    /// Day to book (YYYY-MM-DD); defaults to the first bookable day.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..24))]
    hour: Option<u8>,
    #[arg(long)]
    platform: Option<Platform>,
    /// Create the appointment instead of only listing availability.
    #[arg(long)]
    submit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(api_url) = args.api_url.clone() {
        settings.api_url = api_url;
    }
    if let Some(platform) = args.platform {
        settings.platform = platform;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let api_url = config::normalize_api_url(&settings.api_url)?;
    info!(api_url = %api_url, platform = ?settings.platform, "starting booking client");

    let client = Arc::new(BookingClient::new(api_url));
    let user = client.sign_in(&args.email, &args.password).await?;
    println!("Signed in as {} <{}>", user.name, user.email);

    let now = Local::now();
    let mut screen = SchedulingController::new(
        Arc::clone(&client),
        RouteParams {
            provider_id: ProviderId::new(args.provider_id),
        },
        now,
        settings.platform,
    )
    .with_user(user);

    if let Some(date) = args.date {
        let picked = same_time_on(&now, date)
            .ok_or_else(|| anyhow!("{date} has no {} local time", now.time()))?;
        if picked.date_naive() < screen.state().minimum_date.date_naive() {
            warn!(date = %date, "requested day is before the first bookable day");
        }
        screen.toggle_date_picker();
        screen.on_date_changed(Some(picked));
    }

    let ticket = screen.request_availability();
    let (providers, slots) = futures::join!(
        client.list_providers(),
        client.day_availability(&ticket.provider_id, ticket.query)
    );
    screen.apply_providers(providers);
    screen.complete_availability(ticket, slots);

    if let Some(hour) = args.hour {
        screen.select_hour(hour);
    }
    print_screen(&screen);

    if !args.submit {
        return Ok(());
    }

    match screen.submit().await {
        ScreenEvent::Navigate(Route::AppointmentCreated { date }) => {
            let booked = DateTime::from_timestamp_millis(date)
                .ok_or_else(|| anyhow!("server time {date} out of range"))?
                .with_timezone(&Local);
            println!("Appointment created for {}", booked.format("%d/%m/%Y %H:%M"));
            Ok(())
        }
        ScreenEvent::Alert(alert) => bail!("{}: {}", alert.title, alert.message),
        ScreenEvent::Navigate(Route::Back) => Ok(()),
    }
}

fn print_screen<A: SchedulingApi + ?Sized, Tz: TimeZone>(screen: &SchedulingController<A, Tz>)
where
    Tz::Offset: std::fmt::Display,
{
    let state = screen.state();
    println!("== {}", screen.header().title);

    for provider in &state.providers {
        let marker = if screen.is_provider_selected(&provider.id) {
            '*'
        } else {
            ' '
        };
        println!(" {marker} {} ({})", provider.name, provider.id);
    }

    println!("Date: {}", state.selected_date.format("%d/%m/%Y"));
    print_section(screen, "Manhã", &screen.morning_slots());
    print_section(screen, "Tarde", &screen.afternoon_slots());
}

fn print_section<A: SchedulingApi + ?Sized, Tz: TimeZone>(
    screen: &SchedulingController<A, Tz>,
    title: &str,
    slots: &[HourSlot],
) {
    let cells: Vec<String> = slots
        .iter()
        .map(|slot| match (screen.is_hour_selected(slot.hour), slot.available) {
            (true, _) => format!("[{}]", slot.hour_formatted),
            (false, true) => format!(" {} ", slot.hour_formatted),
            (false, false) => format!(" {}-", slot.hour_formatted),
        })
        .collect();
    println!("{title}: {}", cells.join(""));
}
