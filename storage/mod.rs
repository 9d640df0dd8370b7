pub mod geometry_utils;
pub mod loader;
pub mod writer;

pub use geometry_utils::{data_item_to_feature, items_to_geojson, rectangle_to_polygon};
pub use loader::{load_from_file, load_from_reader, LoadError, LoadStats, RowError, CSV_HEADER};
pub use writer::{write_results, write_results_to_file, OutputError, OutputFormat};
