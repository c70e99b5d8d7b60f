use anyhow::{bail, Context};
use rail_app::{
    AppState, BookingDetailsStage, PassengerDetailsStage, PaymentStep, SeatSelectionStage,
    TicketStage,
};
use rail_catalog::SeatId;
use rail_core::payment::{CardDetails, CardType, MockPaymentSheet, PaymentMethod};
use rail_core::search::{date_strip, SearchQuery, DATE_STRIP_DAYS};
use rail_order::PassengerPatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rail_app=debug,rail_order=debug,rail_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = rail_store::Config::load().context("Failed to load config")?;
    let mut state = AppState::from_config(&config)?;
    tracing::info!("Booking as {} ({})", state.account.full_name, state.account.initials());

    // Results screen
    let query = SearchQuery {
        from: Some("GAY".to_string()),
        to: Some("DEL".to_string()),
        date: None,
    };
    let results = state.catalog.search(&query);
    let Some(train) = results.last() else {
        bail!("No trains configured for GAY -> DEL");
    };
    let train_id = train.id.clone();
    let strip = date_strip(train.date, DATE_STRIP_DAYS);
    tracing::info!(
        "{} trains found, picking {} ({} to {} over {} days)",
        results.len(),
        train.name,
        strip.first().map(|c| c.week.as_str()).unwrap_or_default(),
        strip.last().map(|c| c.week.as_str()).unwrap_or_default(),
        strip.len()
    );

    // Seat map
    let mut seats = SeatSelectionStage::open(&state.catalog, &train_id)?;
    for tap in ["C1", "C2", "A3", "C3", "C3"] {
        let seat: SeatId = tap.parse()?;
        tracing::debug!("Tap {} -> {:?}", tap, seats.tap(&seat));
    }
    let params = seats.confirm(&mut state.journal)?;

    // Passenger details
    let mut passengers = PassengerDetailsStage::from_params(params, &state);
    passengers.update(1, &PassengerPatch::name("Asha Rawat"));
    if let Some(fare) = passengers.fare(&state.pricing)? {
        tracing::info!("Fare for {} passengers: {}", fare.passenger_count, fare.total);
    }
    let params = passengers.confirm()?;

    // Booking details: a declined card first, then a retry
    let mut checkout = BookingDetailsStage::from_params(params, &state)?;
    let mut card = CardDetails::new(CardType::Credit);
    card.number = "4242424242424242".to_string().into();
    card.name = state.account.full_name.clone();
    card.expiry = "12/28".to_string();
    card.cvv = "123".to_string().into();
    checkout.select_payment_method(PaymentMethod::Card(card));

    let declining = MockPaymentSheet::declining("card_declined", "Your card was declined");
    let mut step = checkout.pay(&declining, &mut state.journal).await?;
    if let PaymentStep::Retry(failure) = &step {
        tracing::warn!("First attempt failed ({}), retrying", failure.message);
        let sheet = state.sheet.clone();
        step = checkout.pay(sheet.as_ref(), &mut state.journal).await?;
    }

    let params = match step {
        PaymentStep::Ticket(params) => params,
        PaymentStep::Retry(failure) => {
            bail!("Payment failed: {} {}", failure.code, failure.message)
        }
        PaymentStep::Dropped => bail!("Payment result arrived after the booking was left"),
    };

    // Ticket
    let ticket = TicketStage::issue(&params, &mut state)?;
    println!("{}", ticket);
    tracing::info!("{} booking events recorded", state.journal.len());

    Ok(())
}
