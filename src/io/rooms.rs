//! IO functionality for reading the list of the school's rooms from a JSON file.

use crate::{Result, Room, RoomClass};
use log::debug;

/// Read the rooms from a JSON-serialized list of rooms, e.g.
///
/// ```json
/// [{"name": "Sci A", "class": "science"}, {"name": "U1", "class": "general"}]
/// ```
pub fn read<R: std::io::Read>(reader: R) -> Result<Vec<Room>> {
    let rooms: Vec<Room> = serde_json::from_reader(reader)?;
    debug!("Read {} rooms", rooms.len());
    Ok(rooms)
}

/// The school's room list, used when no room file is given
pub fn default_rooms() -> Vec<Room> {
    const ROOMS: [(&str, RoomClass); 19] = [
        ("Sci A", RoomClass::Science),
        ("Sci B", RoomClass::Science),
        ("Sci C", RoomClass::Science),
        ("Art", RoomClass::Art),
        ("Music Room", RoomClass::Music),
        ("Gym", RoomClass::Gym),
        ("Gym2", RoomClass::Gym),
        ("U1", RoomClass::General),
        ("Steve", RoomClass::General),
        ("U2", RoomClass::General),
        ("U3", RoomClass::General),
        ("U4/5", RoomClass::General),
        ("U6", RoomClass::General),
        ("U7", RoomClass::General),
        ("L2", RoomClass::General),
        ("L3", RoomClass::General),
        ("Library", RoomClass::General),
        ("L4", RoomClass::General),
        ("L6", RoomClass::General),
    ];
    ROOMS
        .iter()
        .map(|(name, class)| Room {
            name: (*name).to_owned(),
            class: *class,
        })
        .collect()
}
