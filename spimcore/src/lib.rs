// error types shared by all modules
pub mod error;

// data model
pub mod model {
    pub mod entity;
    pub mod view;
    pub mod sequence;
    pub mod interest_point;
}

// selection module
pub mod selection {
    pub mod pattern;
    pub mod spec;
    pub mod resolver;
}

// spatial index module
pub mod spatial {
    pub mod index;
    pub mod kdtree;
}

// algorithm module
pub mod algorithm {
    pub mod histogram;
    pub mod nearest_neighbor;
    pub mod verification;
}
