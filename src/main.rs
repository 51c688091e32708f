//! EventHub client
//!
//! Command-line entry point

mod cli;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{debug, error, warn};

use EventHub::{
    config::Settings,
    handlers::{
        handle_create_event, handle_login, handle_logout, handle_signup, EventCard, EventForm, EventsView,
        LoginForm, MyEventsTab, MyEventsView, SignupForm,
    },
    models::Event,
    services::notification::{drain, Notification, NotificationKind},
    state::{AppContext, Route},
    utils::{
        helpers::{format_event_date, format_relative_time, format_short_date, truncate_text},
        errors::ErrorSeverity,
        logging,
    },
    EventHubError,
};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = Settings::new().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        settings.api.base_url = api_url;
    }
    settings.validate()?;

    let _guard = logging::init_logging(&settings.logging)?;
    debug!("{}", EventHub::info());

    let mut ctx = AppContext::new(settings)?;
    let mut notifications = ctx.notifications.subscribe();

    let result = run(&mut ctx, cli.command).await;
    if let Err(e) = &result {
        match e.downcast_ref::<EventHubError>() {
            Some(failure) => {
                match failure.severity() {
                    ErrorSeverity::Info | ErrorSeverity::Warning => warn!(error = %failure, "Command failed"),
                    ErrorSeverity::Error | ErrorSeverity::Critical => error!(error = %failure, "Command failed"),
                }
                if failure.is_recoverable() {
                    eprintln!("This looks temporary; running the command again may help.");
                }
            }
            None => error!(error = %e, "Command failed"),
        }
    }

    ctx.process_session_events()?;
    for notification in drain(&mut notifications) {
        print_notification(&notification);
    }
    let stats = ctx.notifications.stats();
    debug!(total = stats.total(), errors = stats.error, "Notifications emitted");

    result
}

async fn run(ctx: &mut AppContext, command: Commands) -> anyhow::Result<()> {
    let now = Utc::now();

    match command {
        Commands::Login { email, password } => {
            handle_login(ctx, &LoginForm::new(email, password)).await;
        }
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
            role,
        } => {
            let form = SignupForm {
                name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
                role,
            };
            handle_signup(ctx, &form).await;
        }
        Commands::Logout => {
            if let Err(e) = handle_logout(ctx) {
                ctx.notifications.error(e.user_message("Failed to log out"));
            }
        }
        Commands::Whoami => match ctx.user() {
            Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role),
            None => println!("Not logged in"),
        },
        Commands::Events => {
            let mut view = EventsView::new(ctx.user());
            view.refresh(&ctx.api, &ctx.notifications, now).await;
            print_cards(&view.cards(now));
        }
        Commands::MyEvents { created } => {
            let Some(user) = ctx.user().cloned() else {
                ctx.navigate(Route::MyEvents);
                ctx.notifications.warning("Please login to see your events");
                return Ok(());
            };
            let mut view = MyEventsView::new(&user);
            if created {
                view.set_tab(MyEventsTab::Created);
            }
            view.refresh(&ctx.api, &ctx.notifications, now).await;
            print_my_events(&view, now);
        }
        Commands::Create {
            title,
            description,
            location,
            date,
        } => {
            let mut form = EventForm::new(title).with_description(description).with_location(location);
            if let Some(date) = date {
                form = match form.parse_event_date(&date) {
                    Ok(form) => form,
                    Err(e) => {
                        ctx.notifications.error(e.user_message("Please select an event date"));
                        return Ok(());
                    }
                };
            }
            if handle_create_event(ctx, &form, now).await {
                let mut view = EventsView::new(ctx.user());
                view.refresh(&ctx.api, &ctx.notifications, now).await;
                print_cards(&view.cards(now));
            }
        }
        Commands::Delete { id } => {
            let mut view = EventsView::new(ctx.user());
            view.refresh(&ctx.api, &ctx.notifications, now).await;
            view.handle_delete(id, &ctx.api, &ctx.notifications, now).await;
        }
        Commands::Register { id } => {
            let mut view = EventsView::new(ctx.user());
            view.refresh(&ctx.api, &ctx.notifications, now).await;
            view.handle_register(id, &ctx.api, &ctx.notifications, now).await;
            if let Some(card) = view.cards(now).iter().find(|card| card.event.event_id == id) {
                print_card(card);
            }
        }
        Commands::Unregister { id } => {
            let mut view = EventsView::new(ctx.user());
            view.refresh(&ctx.api, &ctx.notifications, now).await;
            view.handle_unregister(id, &ctx.api, &ctx.notifications, now).await;
            if let Some(card) = view.cards(now).iter().find(|card| card.event.event_id == id) {
                print_card(card);
            }
        }
    }

    Ok(())
}

fn print_cards(cards: &[EventCard<'_>]) {
    if cards.is_empty() {
        println!("No events yet.");
        return;
    }
    for card in cards {
        print_card(card);
    }
}

fn print_card(card: &EventCard<'_>) {
    let event = card.event;
    println!("#{} {} [{}]", event.event_id, event.title, card.timing.label());
    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        println!("    {}", truncate_text(description, 120));
    }
    println!("    When:      {}", card.date_label());
    if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
        println!("    Where:     {}", location);
    }
    println!("    Organizer: {}", card.organizer());
    println!("    Attendees: {}", event.registration_count);
    let delete_hint = if card.can_delete { " | delete available" } else { "" };
    println!("    Status:    {}{}", card.status.render(), delete_hint);
}

fn print_my_events(view: &MyEventsView, now: DateTime<Utc>) {
    let (registered, created) = view.counts();
    println!("Registered ({}) | Created ({})", registered, created);

    let events = view.visible();
    if events.is_empty() {
        match view.tab() {
            MyEventsTab::Registered => println!("You haven't registered for any events yet."),
            MyEventsTab::Created => println!("You haven't created any events yet."),
        }
        return;
    }

    for event in events {
        print_my_event(view, event, now);
    }
}

fn print_my_event(view: &MyEventsView, event: &Event, now: DateTime<Utc>) {
    println!("#{} {} - {}", event.event_id, event.title, format_event_date(event.event_date));
    match view.tab() {
        MyEventsTab::Registered => {
            if let Some(registered_at) = event.registered_at {
                println!(
                    "    Registered on {} ({})",
                    format_short_date(registered_at),
                    format_relative_time(registered_at, now)
                );
            }
            if view.can_unregister(event.event_id) {
                println!("    Unregister with: eventhub unregister {}", event.event_id);
            }
        }
        MyEventsTab::Created => println!("    Attendees: {}", event.registration_count),
    }
}

fn print_notification(notification: &Notification) {
    match notification.kind {
        NotificationKind::Error | NotificationKind::Warning => {
            eprintln!("[{}] {}", notification.kind, notification.message)
        }
        _ => println!("[{}] {}", notification.kind, notification.message),
    }
}
