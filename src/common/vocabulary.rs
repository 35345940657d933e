/// Class vocabulary of the car-part detection model, in output-row order.
pub const CAR_PARTS: [&str; 23] = [
    "back_bumper",
    "back_door",
    "back_glass",
    "back_left_door",
    "back_left_light",
    "back_light",
    "back_right_door",
    "back_right_light",
    "front_bumper",
    "front_door",
    "front_glass",
    "front_left_door",
    "front_left_light",
    "front_light",
    "front_right_door",
    "front_right_light",
    "hood",
    "left_mirror",
    "object",
    "right_mirror",
    "tailgate",
    "trunk",
    "wheel",
];

pub fn car_part_names() -> Vec<String> {
    CAR_PARTS.iter().map(|x| x.to_string()).collect()
}
