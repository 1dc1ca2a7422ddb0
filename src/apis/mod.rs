pub mod arcgis;
pub mod bom;
pub mod spc;
