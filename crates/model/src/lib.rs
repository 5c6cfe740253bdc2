pub mod core {
    pub mod identifiers;
    pub mod naming;
    pub mod value;
}

pub mod records {
    pub mod params;
    pub mod row;
}
