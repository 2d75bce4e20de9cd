pub mod curriculum_menu;
pub mod drill_summary;
pub mod keyboard_diagram;
pub mod word_card;
