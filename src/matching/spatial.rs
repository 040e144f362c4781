// src/matching/spatial.rs - Uniform grid over lat/lng for proximity lookups
use std::collections::HashMap;

use crate::models::core::Matchable;

pub type CellKey = (i64, i64);

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

pub fn cell_key(lat: f64, lng: f64, cell_size: f64) -> CellKey {
    ((lat / cell_size).floor() as i64, (lng / cell_size).floor() as i64)
}

/// Buckets record positions (indices into the slice it was built from) by
/// grid cell. Records without coordinates are left out.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
    indexed: usize,
}

impl SpatialIndex {
    pub fn build<M: Matchable>(records: &[M], cell_size: f64) -> Self {
        Self::from_points(
            records.iter().enumerate().map(|(i, r)| (i, r.coordinates())),
            cell_size,
        )
    }

    pub fn from_points<I>(points: I, cell_size: f64) -> Self
    where
        I: IntoIterator<Item = (usize, Option<(f64, f64)>)>,
    {
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        let mut indexed = 0;
        for (idx, coords) in points {
            if let Some((lat, lng)) = coords {
                cells.entry(cell_key(lat, lng, cell_size)).or_default().push(idx);
                indexed += 1;
            }
        }
        Self {
            cell_size,
            cells,
            indexed,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of records that had coordinates.
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    /// Members of the point's own cell only.
    pub fn same_cell(&self, lat: f64, lng: f64) -> &[usize] {
        self.cells
            .get(&cell_key(lat, lng, self.cell_size))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Members of the 3x3 block of cells around the point. The neighbours
    /// are required: two points closer than the cell size can sit in
    /// adjacent cells.
    pub fn neighbors(&self, lat: f64, lng: f64) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = cell_key(lat, lng, self.cell_size);
        // cells past the i64 range do not exist
        (-1..=1i64)
            .flat_map(move |d_row| {
                (-1..=1i64).filter_map(move |d_col| {
                    Some((row.checked_add(d_row)?, col.checked_add(d_col)?))
                })
            })
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|members| members.iter().copied())
    }
}

/// Great-circle distance in meters.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let (delta_phi, delta_lambda) = ((lat2 - lat1).to_radians(), (lon2 - lon1).to_radians());
    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Largest pairwise distance among the given points, `None` with fewer than two.
pub fn max_spread_meters(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let mut max = 0.0_f64;
    for (i, &(lat1, lng1)) in points.iter().enumerate() {
        for &(lat2, lng2) in &points[i + 1..] {
            max = max.max(calculate_distance(lat1, lng1, lat2, lng2));
        }
    }
    Some(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::RecordDraft;

    const T: f64 = 0.005;

    fn at(lat: f64, lng: f64) -> RecordDraft {
        RecordDraft::new("x", "ID", Some(lat), Some(lng))
    }

    #[test]
    fn test_cell_key_floors_negative_coordinates() {
        assert_eq!(cell_key(45.0021, -114.0021, T), (9000, -22801));
        assert_eq!(cell_key(-0.001, -0.001, T), (-1, -1));
    }

    #[test]
    fn test_records_without_coordinates_are_not_indexed() {
        let records = vec![at(45.0, -115.0), RecordDraft::new("y", "ID", None, Some(-115.0))];
        let index = SpatialIndex::build(&records, T);
        assert_eq!(index.len(), 1);
        assert_eq!(index.cell_count(), 1);
    }

    #[test]
    fn test_neighbors_cover_adjacent_cells() {
        // Either side of the 45.005 cell boundary.
        let records = vec![at(45.0049, -115.0021), at(45.0051, -115.0021), at(45.0200, -115.0021)];
        let index = SpatialIndex::build(&records, T);
        assert_ne!(
            cell_key(45.0049, -115.0021, T),
            cell_key(45.0051, -115.0021, T)
        );

        let from_first: Vec<usize> = index.neighbors(45.0049, -115.0021).collect();
        assert!(from_first.contains(&0));
        assert!(from_first.contains(&1));
        assert!(!from_first.contains(&2));

        assert_eq!(index.same_cell(45.0049, -115.0021), &[0]);
    }

    #[test]
    fn test_same_cell_on_empty_index() {
        let index = SpatialIndex::build::<RecordDraft>(&[], T);
        assert!(index.is_empty());
        assert!(index.same_cell(1.0, 1.0).is_empty());
        assert_eq!(index.neighbors(1.0, 1.0).count(), 0);
    }

    #[test]
    fn test_neighbors_at_saturated_cell_keys() {
        // a tiny cell size pushes keys to the i64 limits
        let records = vec![at(45.83, -114.75)];
        let index = SpatialIndex::build(&records, 1e-300);
        assert_eq!(cell_key(45.83, -114.75, 1e-300), (i64::MAX, i64::MIN));
        let found: Vec<usize> = index.neighbors(45.83, -114.75).collect();
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn test_calculate_distance() {
        assert!(calculate_distance(45.0, -115.0, 45.0, -115.0).abs() < 1e-6);
        // 0.001 degrees of latitude is roughly 111 meters
        let d = calculate_distance(45.0, -115.0, 45.001, -115.0);
        assert!((d - 111.19).abs() < 0.5, "distance was {}", d);
        assert_eq!(max_spread_meters(&[(45.0, -115.0)]), None);
    }
}
