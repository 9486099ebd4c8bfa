use crate::room::Room;
use crate::storage::StoreStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    room_type: String,
    #[tabled(rename = "Building")]
    building: String,
    #[tabled(rename = "Room")]
    room_number: String,
    #[tabled(rename = "Capacity")]
    capacity: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&Room> for RoomRow {
    fn from(room: &Room) -> Self {
        let capacity = room
            .attributes
            .get("capacity")
            .map(|v| v.to_string())
            .unwrap_or_default();
        Self {
            id: room.id,
            name: room.name.clone(),
            room_type: room.room_type.clone().unwrap_or_default(),
            building: room.location.building.clone().unwrap_or_default(),
            room_number: room.location.room_number.clone().unwrap_or_default(),
            capacity,
            active: if room.is_active { "yes" } else { "no" }.to_string(),
        }
    }
}

/// Render a room listing as a rounded table
pub fn room_table(rooms: &[Room]) -> String {
    if rooms.is_empty() {
        return String::new();
    }
    let rows: Vec<RoomRow> = rooms.iter().map(Into::into).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render store statistics as a two-column table
pub fn stats_table(stats: &StoreStats) -> String {
    let rows = vec![
        StatRow {
            metric: "Rooms".to_string(),
            value: stats.rooms.to_string(),
        },
        StatRow {
            metric: "Attribute definitions".to_string(),
            value: stats.attributes.to_string(),
        },
        StatRow {
            metric: "Value rows".to_string(),
            value: stats.values.to_string(),
        },
    ];
    Table::new(&rows).with(Style::rounded()).to_string()
}
