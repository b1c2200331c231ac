pub mod discourse_map;
