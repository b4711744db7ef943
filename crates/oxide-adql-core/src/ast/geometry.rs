//! The geometry function vocabulary.
//!
//! Geometry names are ordinary identifiers to the lexer; the parser consults
//! [`GeometryFunction::from_name`] when it sees `IDENTIFIER '('` to decide
//! between a geometry call and a generic function call.

/// Geometry constructors, accessors and predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GeometryFunction {
    // Constructors
    Point,
    Circle,
    Box,
    Polygon,
    Region,

    // Predicates
    Contains,
    Intersects,

    // Scalar accessors
    Area,
    Centroid,
    Coord1,
    Coord2,
    Coordsys,
    Distance,
}

impl GeometryFunction {
    /// Looks up a geometry function by name, ignoring ASCII case.
    ///
    /// Pure: safe to call any number of times while backtracking.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "POINT" => Some(Self::Point),
            "CIRCLE" => Some(Self::Circle),
            "BOX" => Some(Self::Box),
            "POLYGON" => Some(Self::Polygon),
            "REGION" => Some(Self::Region),
            "CONTAINS" => Some(Self::Contains),
            "INTERSECTS" => Some(Self::Intersects),
            "AREA" => Some(Self::Area),
            "CENTROID" => Some(Self::Centroid),
            "COORD1" => Some(Self::Coord1),
            "COORD2" => Some(Self::Coord2),
            "COORDSYS" => Some(Self::Coordsys),
            "DISTANCE" => Some(Self::Distance),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::Circle => "CIRCLE",
            Self::Box => "BOX",
            Self::Polygon => "POLYGON",
            Self::Region => "REGION",
            Self::Contains => "CONTAINS",
            Self::Intersects => "INTERSECTS",
            Self::Area => "AREA",
            Self::Centroid => "CENTROID",
            Self::Coord1 => "COORD1",
            Self::Coord2 => "COORD2",
            Self::Coordsys => "COORDSYS",
            Self::Distance => "DISTANCE",
        }
    }

    /// Minimum and maximum argument counts. `None` means unbounded.
    #[must_use]
    pub const fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Self::Point => (2, Some(3)),
            Self::Circle => (2, Some(4)),
            Self::Box => (3, Some(5)),
            Self::Polygon => (3, None),
            Self::Region
            | Self::Area
            | Self::Centroid
            | Self::Coord1
            | Self::Coord2
            | Self::Coordsys => (1, Some(1)),
            Self::Contains | Self::Intersects => (2, Some(2)),
            Self::Distance => (2, Some(4)),
        }
    }

    /// Returns true if a call with `count` arguments so far must continue.
    #[must_use]
    pub const fn needs_more(&self, count: usize) -> bool {
        let (min, _) = self.arity();
        // DISTANCE takes two points or four coordinates, never three.
        count < min || matches!((self, count), (Self::Distance, 3))
    }

    /// Returns true if a call with `count` arguments may take another.
    #[must_use]
    pub const fn accepts_more(&self, count: usize) -> bool {
        match self.arity() {
            (_, Some(max)) => count < max,
            (_, None) => true,
        }
    }

    /// Returns true for the boolean-valued predicates.
    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(self, Self::Contains | Self::Intersects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(GeometryFunction::from_name("point"), Some(GeometryFunction::Point));
        assert_eq!(
            GeometryFunction::from_name("Contains"),
            Some(GeometryFunction::Contains)
        );
        assert_eq!(GeometryFunction::from_name("sqrt"), None);
    }

    #[test]
    fn test_distance_arity() {
        let d = GeometryFunction::Distance;
        assert!(d.needs_more(1));
        assert!(!d.needs_more(2));
        assert!(d.needs_more(3));
        assert!(!d.needs_more(4));
        assert!(d.accepts_more(3));
        assert!(!d.accepts_more(4));
    }

    #[test]
    fn test_polygon_is_unbounded() {
        let p = GeometryFunction::Polygon;
        assert!(p.needs_more(2));
        assert!(!p.needs_more(3));
        assert!(p.accepts_more(1000));
    }
}
