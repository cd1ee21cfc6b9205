use super::{local_time, outcome};
use anyhow::Result;
use stagepass::App;
use stagepass::SeatQuantity;
use stagepass::confirm::prompt_line;
use stagepass::features::booking::{BookingAction, BookingStage, CardDetails};
use stagepass::features::my_bookings::MyBookingsAction;
use stagepass_gateway::{BookingId, PerformanceId};

pub async fn book(app: &App, id: u64, seats: u32) -> Result<()> {
    let quantity = SeatQuantity::try_from(seats)?;
    let performance = super::catalog::fetch(app, PerformanceId::new(id)).await?;
    let title = performance.title.clone();

    let store = app.booking(performance, quantity);
    let total = store.state(|s| s.total_price()).await;
    println!("Reserving {quantity} seat(s) for {title}, total {total}");

    app.run(&store, BookingAction::Reserve).await;
    let (booking_id, deadline, error) = store
        .state(|s| (s.booking_id.clone(), s.payment_deadline, s.error.clone()))
        .await;
    outcome(app, error).await?;

    if let Some(booking_id) = &booking_id {
        println!("Reserved. Booking {booking_id}");
    }
    if let Some(deadline) = deadline {
        println!("Please complete payment by {}.", local_time(deadline));
    }
    println!("Test cards: a card number ending in 0, 1 or 9 is approved.");

    loop {
        let choice = prompt_line("[p]ay, [c]ancel or [q]uit? ".to_string()).await?;
        match choice.trim().to_ascii_lowercase().as_str() {
            "p" | "pay" => {
                let number = prompt_line("Card number: ".to_string()).await?;
                let cvv = prompt_line("CVV: ".to_string()).await?;
                let card = CardDetails::new(&number, &cvv);
                println!("Charging card {}", card.grouped_number());

                app.run(&store, BookingAction::Pay { card }).await;
            },
            "c" | "cancel" => app.run(&store, BookingAction::Cancel).await,
            "q" | "quit" | "" => {
                println!("The reservation is held until it is paid or cancelled.");
                return Ok(());
            },
            other => {
                println!("Unknown choice `{other}`");
                continue;
            },
        }

        let (stage, confirmation, error) = store
            .state(|s| (s.stage, s.confirmation.clone(), s.error.clone()))
            .await;
        match stage {
            BookingStage::Complete => {
                println!("{}", confirmation.as_deref().unwrap_or("Payment complete."));
                return Ok(());
            },
            BookingStage::Cancelled => {
                println!("Reservation cancelled.");
                return Ok(());
            },
            BookingStage::Reserving | BookingStage::Paying => {
                if let Some(error) = error {
                    if error.is_authentication() {
                        return outcome(app, Some(error)).await;
                    }
                    println!("{error}");
                }
            },
        }
    }
}

pub async fn list(app: &App) -> Result<()> {
    let store = app.my_bookings();
    app.run(&store, MyBookingsAction::Load).await;
    let (bookings, error) = store
        .state(|s| (s.bookings.clone(), s.error.clone()))
        .await;
    outcome(app, error).await?;

    if bookings.is_empty() {
        println!("No bookings.");
    }
    for booking in bookings {
        let booked_at = booking
            .created_at
            .map(|at| local_time(at.at()))
            .unwrap_or_default();
        println!(
            "{:<24}  performance {:>5}  {:>2} seats  {:>9}  {:<16}  {}",
            booking.booking_id.to_string(),
            booking.performance_id.to_string(),
            booking.quantity,
            booking.total_amount.to_string(),
            booking.status.label(),
            booked_at
        );
    }
    Ok(())
}

pub async fn cancel(app: &App, booking_id: String) -> Result<()> {
    let store = app.my_bookings();
    app.run(&store, MyBookingsAction::Load).await;
    outcome(app, store.state(|s| s.error.clone()).await).await?;

    let booking_id = BookingId::new(booking_id);
    app.run(
        &store,
        MyBookingsAction::Cancel {
            booking_id: booking_id.clone(),
        },
    )
    .await;
    outcome(app, store.state(|s| s.error.clone()).await).await?;

    let status = store
        .state(|s| {
            s.bookings
                .iter()
                .find(|b| b.booking_id == booking_id)
                .map(|b| b.status.clone())
        })
        .await;
    if status.is_some_and(|status| !status.is_cancellable()) {
        println!("Booking {booking_id} cancelled.");
    } else {
        println!("Booking {booking_id} left unchanged.");
    }
    Ok(())
}
