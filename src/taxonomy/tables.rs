// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static sign tables
//!
//! Two native labelings are supported: the compact integer-indexed set used
//! by the original recognition model, and the string-keyed StreetSignSense
//! label set (`forb_*`, `warn_*`, `mand_*`, `info_*`, `end_*`).

use super::SignCategory;
use super::SignCategory::{Construction, Guide, Regulatory, Warning};

/// One row of a static table
#[derive(Debug, Clone, Copy)]
pub struct TableEntry {
    pub name: &'static str,
    pub category: SignCategory,
    pub description: &'static str,
    pub rules: &'static str,
}

const fn entry(
    name: &'static str,
    category: SignCategory,
    description: &'static str,
    rules: &'static str,
) -> TableEntry {
    TableEntry {
        name,
        category,
        description,
        rules,
    }
}

/// Integer-indexed table; position is the class id
pub static INDEX_TABLE: [TableEntry; 21] = [
    entry("Stop Sign", Regulatory, "Come to a complete stop.", "Stop completely before proceeding."),
    entry("Yield Sign", Regulatory, "Yield to other traffic.", "Slow down and give way to other vehicles."),
    entry("Speed Limit 20", Regulatory, "Maximum speed 20 km/h.", "Do not exceed 20 km/h in this zone."),
    entry("Speed Limit 30", Regulatory, "Maximum speed 30 km/h.", "Do not exceed 30 km/h in this zone."),
    entry("Speed Limit 50", Regulatory, "Maximum speed 50 km/h.", "Do not exceed 50 km/h in this zone."),
    entry("Speed Limit 60", Regulatory, "Maximum speed 60 km/h.", "Do not exceed 60 km/h in this zone."),
    entry("Speed Limit 70", Regulatory, "Maximum speed 70 km/h.", "Do not exceed 70 km/h in this zone."),
    entry("Speed Limit 80", Regulatory, "Maximum speed 80 km/h.", "Do not exceed 80 km/h in this zone."),
    entry("No Entry", Regulatory, "Entry prohibited.", "Do not enter this road."),
    entry("No Parking", Regulatory, "Parking not allowed.", "Do not park in this area."),
    entry("No U-Turn", Regulatory, "U-turns prohibited.", "Do not make a U-turn here."),
    entry("One Way", Regulatory, "Traffic flows one direction.", "Travel only in the direction indicated."),
    entry("Pedestrian Crossing", Warning, "Pedestrians may cross ahead.", "Slow down and watch for pedestrians."),
    entry("Deer Crossing", Warning, "Wildlife may cross the road.", "Be alert for deer, especially at dawn/dusk."),
    entry("Road Work", Construction, "Construction zone ahead.", "Slow down and watch for workers."),
    entry("Curve Ahead", Warning, "Road curves ahead.", "Reduce speed before entering the curve."),
    entry("Slippery Road", Warning, "Road may be slippery.", "Reduce speed in wet conditions."),
    entry("Railroad Crossing", Warning, "Railroad tracks ahead.", "Look both ways and never stop on tracks."),
    entry("School Zone", Warning, "School area ahead.", "Reduce speed and watch for children."),
    entry("Hospital", Guide, "Hospital nearby.", "Follow signs for hospital access."),
    entry("Parking", Guide, "Parking available.", "Parking is permitted in this area."),
];

macro_rules! speed_limit {
    ($token:literal, $kmh:literal) => {
        (
            $token,
            entry(
                concat!("Speed Limit ", $kmh, " km/h"),
                Regulatory,
                concat!("Maximum speed of ", $kmh, " km/h allowed."),
                concat!("Do not exceed ", $kmh, " km/h in this zone."),
            ),
        )
    };
}

/// String-keyed table, keyed by the model's raw label
pub static LABEL_TABLE: &[(&str, TableEntry)] = &[
    // Prohibitions
    speed_limit!("forb_speed_over_5", "5"),
    speed_limit!("forb_speed_over_10", "10"),
    speed_limit!("forb_speed_over_20", "20"),
    speed_limit!("forb_speed_over_30", "30"),
    speed_limit!("forb_speed_over_40", "40"),
    speed_limit!("forb_speed_over_50", "50"),
    speed_limit!("forb_speed_over_60", "60"),
    speed_limit!("forb_speed_over_70", "70"),
    speed_limit!("forb_speed_over_80", "80"),
    speed_limit!("forb_speed_over_90", "90"),
    speed_limit!("forb_speed_over_100", "100"),
    speed_limit!("forb_speed_over_110", "110"),
    speed_limit!("forb_speed_over_120", "120"),
    speed_limit!("forb_speed_over_130", "130"),
    ("forb_no_entry", entry("No Entry", Regulatory, "Entry prohibited into this road.", "Entry is prohibited. Do not enter this road.")),
    ("forb_no_vehicles", entry("No Vehicles", Regulatory, "No vehicles allowed beyond this point.", "Do not drive past this sign.")),
    ("forb_no_trucks", entry("No Trucks", Regulatory, "Trucks prohibited on this road.", "Trucks must take another route.")),
    ("forb_no_bicycles", entry("No Bicycles", Regulatory, "Bicycles not allowed on this road.", "Cyclists must take another route.")),
    ("forb_no_pedestrians", entry("No Pedestrians", Regulatory, "Pedestrians not allowed.", "Pedestrians must not walk on this road.")),
    ("forb_no_parking", entry("No Parking", Regulatory, "Parking prohibited in this area.", "Parking is not allowed. Vehicles may be towed.")),
    ("forb_no_stopping", entry("No Stopping", Regulatory, "Stopping prohibited.", "Do not stop here, even briefly.")),
    ("forb_no_overtaking", entry("No Overtaking", Regulatory, "Overtaking/passing prohibited.", "Do not pass other vehicles until the restriction ends.")),
    ("forb_no_horn", entry("No Horn", Regulatory, "Use of horn prohibited.", "Do not sound your horn in this area.")),
    ("forb_no_left_turn", entry("No Left Turn", Regulatory, "Left turn prohibited.", "Do not turn left at this intersection.")),
    ("forb_no_right_turn", entry("No Right Turn", Regulatory, "Right turn prohibited.", "Do not turn right at this intersection.")),
    ("forb_no_u_turn", entry("No U-Turn", Regulatory, "U-turn prohibited.", "U-turns are prohibited at this location.")),
    // Warnings
    ("warn_children", entry("Children Crossing", Warning, "School zone or children may be crossing ahead.", "School zone. Watch for children and reduce speed.")),
    ("warn_pedestrian", entry("Pedestrian Crossing", Warning, "Pedestrian crossing ahead.", "Watch for pedestrians. Slow down and be prepared to stop.")),
    ("warn_bicycle", entry("Bicycle Crossing", Warning, "Bicycle crossing ahead.", "Watch for cyclists crossing the road.")),
    ("warn_traffic_light", entry("Traffic Light Ahead", Warning, "Traffic signals ahead. Be prepared to stop.", "Be prepared to stop at the signals ahead.")),
    ("warn_curve_left", entry("Curve Left", Warning, "Sharp curve to the left ahead.", "Road curves ahead. Reduce speed before the curve.")),
    ("warn_curve_right", entry("Curve Right", Warning, "Sharp curve to the right ahead.", "Road curves ahead. Reduce speed before the curve.")),
    ("warn_double_curve", entry("Double Curve", Warning, "Winding road with multiple curves ahead.", "Reduce speed and keep to your lane through the curves.")),
    ("warn_slippery", entry("Slippery Road", Warning, "Road may be slippery when wet.", "Reduce speed in wet conditions.")),
    ("warn_bumpy", entry("Bumpy Road", Warning, "Rough or uneven road surface ahead.", "Slow down over the uneven surface.")),
    ("warn_roadwork", entry("Road Work Ahead", Construction, "Construction or maintenance work ahead.", "Construction zone ahead. Reduce speed and watch for workers.")),
    ("warn_crossroad", entry("Crossroad Ahead", Warning, "Intersection ahead.", "Slow down and watch for crossing traffic.")),
    ("warn_roundabout", entry("Roundabout Ahead", Warning, "Roundabout/traffic circle ahead.", "Slow down and give way to traffic in the roundabout.")),
    ("warn_narrow", entry("Road Narrows", Warning, "Road width decreases ahead.", "Reduce speed and watch for oncoming traffic.")),
    ("warn_animal", entry("Animal Crossing", Warning, "Wild animals may cross the road.", "Be alert for animals, especially at dawn/dusk.")),
    ("warn_general", entry("General Caution", Warning, "General warning - be alert for hazards.", "Slow down and be alert for hazards.")),
    ("warn_steep", entry("Steep Hill", Warning, "Steep incline ahead.", "Use a lower gear and control your speed.")),
    // Mandatory directions
    ("mand_straight", entry("Go Straight", Regulatory, "Proceed straight ahead only.", "Continue straight ahead. Turning is not allowed.")),
    ("mand_left", entry("Turn Left", Regulatory, "Mandatory left turn ahead.", "You must turn left.")),
    ("mand_right", entry("Turn Right", Regulatory, "Mandatory right turn ahead.", "You must turn right.")),
    ("mand_straight_left", entry("Go Straight or Left", Regulatory, "Proceed straight or turn left.", "Continue straight or turn left only.")),
    ("mand_straight_right", entry("Go Straight or Right", Regulatory, "Proceed straight or turn right.", "Continue straight or turn right only.")),
    ("mand_keep_left", entry("Keep Left", Regulatory, "Keep to the left of the obstacle.", "Pass the obstacle on its left side.")),
    ("mand_keep_right", entry("Keep Right", Regulatory, "Keep to the right of the obstacle.", "Pass the obstacle on its right side.")),
    ("mand_roundabout", entry("Roundabout", Regulatory, "Enter roundabout and follow direction.", "Enter the roundabout and follow the direction of the arrows.")),
    // Priority
    ("stop", entry("Stop", Regulatory, "Come to a complete stop at the line.", "Come to a complete stop. Check all directions before proceeding.")),
    ("yield", entry("Yield", Regulatory, "Give way to traffic on the main road.", "Slow down and give way to other traffic. Stop if necessary.")),
    ("priority_road", entry("Priority Road", Regulatory, "You are on a priority road.", "You have right of way at the next intersections.")),
    ("end_priority", entry("End of Priority", Regulatory, "End of priority road.", "You no longer have right of way. Be ready to yield.")),
    // Information
    ("info_parking", entry("Parking", Guide, "Parking area available.", "Parking is permitted in this area.")),
    ("info_hospital", entry("Hospital", Guide, "Hospital nearby.", "Hospital nearby. Follow signs for hospital access.")),
    ("info_gas", entry("Gas Station", Guide, "Gas/fuel station ahead.", "Fuel is available ahead.")),
    // End of restrictions
    ("end_speed", entry("End of Speed Limit", Guide, "Speed restriction ends.", "The posted speed restriction no longer applies.")),
    ("end_no_overtaking", entry("End of No Overtaking", Guide, "Overtaking now permitted.", "Overtaking is permitted again when safe.")),
];
