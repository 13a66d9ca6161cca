use anyhow::Result;
use clap::Subcommand;
use roombook_sdk::{
    CreateReviewRequest, CreateRoomRequest, RoomItem, RoomSearchQuery, RoombookClient,
    UpdateRoomRequest,
};

use crate::{authed_client, fail};

#[derive(Subcommand)]
pub enum RoomAction {
    /// List all rooms
    List,
    /// Show a single room
    Show {
        /// Room ID
        id: i32,
    },
    /// Search rooms by price range, location and availability
    Search {
        #[arg(long)]
        price_min: Option<String>,
        #[arg(long)]
        price_max: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        available: Option<bool>,
    },
    /// Create a room (administrator only)
    Create {
        title: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        image: Option<String>,
        /// Create the room as unavailable
        #[arg(long)]
        unavailable: bool,
    },
    /// Update a room (administrator only)
    Update {
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        available: Option<bool>,
    },
    /// Delete a room (administrator only)
    Delete {
        id: i32,
    },
    /// List reviews of a room
    Reviews {
        id: i32,
    },
    /// Review a room
    Review {
        id: i32,
        /// Rating from 1 to 5
        #[arg(long)]
        rating: i16,
        #[arg(long)]
        comment: Option<String>,
    },
}

pub fn format_room(room: &RoomItem) -> String {
    let status = if room.availability { "🟢" } else { "🔴" };
    format!(
        "{} #{} {} | 📍 {} | 💰 {:.2}",
        status, room.id, room.title, room.location, room.price
    )
}

fn print_rooms(rooms: &[RoomItem]) {
    if rooms.is_empty() {
        println!("📭 No rooms found.");
        return;
    }
    println!("🏨 Rooms ({} total):", rooms.len());
    for (i, room) in rooms.iter().enumerate() {
        println!("  {}. {}", i + 1, format_room(room));
    }
}

pub async fn handle_room_command(server: &str, action: RoomAction) -> Result<()> {
    let client = RoombookClient::new(server);

    match action {
        RoomAction::List => match client.list_rooms().await {
            Ok(rooms) => print_rooms(&rooms),
            Err(e) => fail("Failed to list rooms", e),
        },
        RoomAction::Show { id } => match client.get_room(id).await {
            Ok(room) => {
                println!("{}", format_room(&room));
                println!("   {}", room.description);
                if let Some(image) = room.image {
                    println!("   🖼️  {}", image);
                }
            }
            Err(e) => fail("Failed to get room", e),
        },
        RoomAction::Search {
            price_min,
            price_max,
            location,
            available,
        } => {
            let query = RoomSearchQuery {
                price_min,
                price_max,
                location,
                available,
            };
            match client.search_rooms(&query).await {
                Ok(rooms) => print_rooms(&rooms),
                Err(e) => fail("Search failed", e),
            }
        }
        RoomAction::Create {
            title,
            price,
            location,
            description,
            image,
            unavailable,
        } => {
            let request = CreateRoomRequest {
                title,
                price,
                location,
                description,
                image,
                availability: !unavailable,
            };
            match authed_client(server).create_room(&request).await {
                Ok(room) => println!("✅ Room created: {}", format_room(&room)),
                Err(e) => fail("Failed to create room", e),
            }
        }
        RoomAction::Update {
            id,
            title,
            price,
            location,
            description,
            image,
            available,
        } => {
            let request = UpdateRoomRequest {
                title,
                price,
                location,
                description,
                image,
                availability: available,
            };
            match authed_client(server).update_room(id, &request).await {
                Ok(room) => println!("✅ Room updated: {}", format_room(&room)),
                Err(e) => fail("Failed to update room", e),
            }
        }
        RoomAction::Delete { id } => match authed_client(server).delete_room(id).await {
            Ok(()) => println!("🗑️  Room {} deleted", id),
            Err(e) => fail("Failed to delete room", e),
        },
        RoomAction::Reviews { id } => match client.list_reviews(id).await {
            Ok(reviews) if reviews.is_empty() => println!("📭 No reviews yet."),
            Ok(reviews) => {
                println!("⭐ Reviews ({} total):", reviews.len());
                for review in reviews {
                    println!(
                        "  {} {} ({})",
                        "★".repeat(review.rating.max(0) as usize),
                        review.comment.unwrap_or_default(),
                        review.created_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
            Err(e) => fail("Failed to list reviews", e),
        },
        RoomAction::Review {
            id,
            rating,
            comment,
        } => {
            let request = CreateReviewRequest { rating, comment };
            match authed_client(server).create_review(id, &request).await {
                Ok(review) => println!("✅ Review #{} saved", review.id),
                Err(e) => fail("Failed to save review", e),
            }
        }
    }

    Ok(())
}
