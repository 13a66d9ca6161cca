use anyhow::Result;
use clap::Subcommand;

use crate::{authed_client, fail};

#[derive(Subcommand)]
pub enum BookingAction {
    /// Book a room
    Create {
        /// Room ID
        room_id: i32,
    },
    /// List my bookings, newest first
    List,
    /// Cancel one of my bookings
    Cancel {
        /// Booking ID
        id: i32,
    },
}

pub async fn handle_booking_command(server: &str, action: BookingAction) -> Result<()> {
    let client = authed_client(server);

    match action {
        BookingAction::Create { room_id } => match client.book_room(room_id).await {
            Ok(booking) => {
                println!("✅ Room {} booked!", booking.room_id);
                println!("   🆔 Booking ID: {}", booking.id);
                println!(
                    "   📅 Date: {}",
                    booking.booking_date.format("%Y-%m-%d %H:%M:%S")
                );
            }
            Err(e) => fail("Booking failed", e),
        },
        BookingAction::List => match client.list_bookings().await {
            Ok(bookings) if bookings.is_empty() => println!("📭 No bookings found."),
            Ok(bookings) => {
                println!("📋 Bookings ({} total):", bookings.len());
                for (i, booking) in bookings.iter().enumerate() {
                    let room = booking
                        .room
                        .as_ref()
                        .map(|room| format!("{} ({})", room.title, room.location))
                        .unwrap_or_else(|| format!("room #{}", booking.room_id));
                    println!(
                        "  {}. 🆔 {} | 🏨 {} | 📅 {}",
                        i + 1,
                        booking.id,
                        room,
                        booking.booking_date.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
            Err(e) => fail("Failed to list bookings", e),
        },
        BookingAction::Cancel { id } => match client.cancel_booking(id).await {
            Ok(()) => println!("🗑️  Booking {} cancelled", id),
            Err(e) => fail("Failed to cancel booking", e),
        },
    }

    Ok(())
}
