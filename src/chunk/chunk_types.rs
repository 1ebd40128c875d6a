//! Chunk tags this decoder understands

/// Declares a chunk tag constant from its 4 ASCII characters
macro_rules! chunk_tag {
    ($(#[$doc:meta])* $const_name:ident = $a:literal $b:literal $c:literal $d:literal) => {
        $(#[$doc])*
        pub const $const_name: [char; 4] = [$a, $b, $c, $d];
    };
}

chunk_tag!(
    /// Tag of the single header chunk that opens every file
    HEADER_CHUNK = 'M' 'T' 'h' 'd'
);
chunk_tag!(
    /// Tag of a track chunk holding one track's events
    TRACK_DATA_CHUNK = 'M' 'T' 'r' 'k'
);
