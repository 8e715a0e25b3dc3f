//! Core traits for stledit

use crate::{loader::Triangle, mesh::*, point::*};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

fn bounds<'a, I>(points: I) -> (Point3f, Point3f)
where
    I: IntoIterator<Item = &'a Point3f>,
{
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return (Point3f::origin(), Point3f::origin());
    };

    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (min, max)
}

impl Drawable for MeshData {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds(self.vertices.iter().map(|v| &v.position))
    }
}

impl Drawable for [Vertex] {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds(self.iter().map(|v| &v.position))
    }
}

impl Drawable for [Triangle] {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds(self.iter().flat_map(|t| t.vertices.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{build_mesh, cube_triangles};

    #[test]
    fn test_cube_bounds() {
        let triangles = cube_triangles(1.5);
        let mesh = build_mesh(&triangles).unwrap();

        let (min, max) = mesh.bounding_box();
        assert_eq!(min, Point3f::new(-1.5, -1.5, -1.5));
        assert_eq!(max, Point3f::new(1.5, 1.5, 1.5));
        assert_eq!(mesh.center(), Point3f::origin());
        assert_eq!(triangles.as_slice().bounding_box(), (min, max));
    }

    #[test]
    fn test_empty_bounds() {
        let mesh = MeshData::default();
        assert_eq!(mesh.bounding_box(), (Point3f::origin(), Point3f::origin()));
    }
}
