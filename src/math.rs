use nalgebra as na;
use num_traits::{Float, FromPrimitive};

pub fn path_length(points: &[na::Point2<f64>]) -> f64 {
    points
        .windows(2)
        .map(|w| na::distance(&w[0], &w[1]))
        .sum()
}

/// Centered moving average; windows near the ends shrink to the available
/// neighbours.
pub fn moving_average(points: &[na::Point2<f64>], window: usize) -> Vec<na::Point2<f64>> {
    let half = window / 2;
    let last = points.len().saturating_sub(1);

    (0..points.len())
        .map(|i| {
            let span = &points[i.saturating_sub(half)..=(i + half).min(last)];
            let sum = span
                .iter()
                .fold(na::Vector2::<f64>::zeros(), |acc, p| acc + p.coords);

            na::Point2::from(sum / span.len() as f64)
        })
        .collect()
}

pub fn centroid(points: &[na::Point2<f64>]) -> Option<na::Point2<f64>> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .iter()
        .fold(na::Vector2::<f64>::zeros(), |acc, p| acc + p.coords);

    Some(na::Point2::from(sum / points.len() as f64))
}

/// Root mean square distance of the points from their centroid.
pub fn rms_radius(points: &[na::Point2<f64>]) -> f64 {
    let c = match centroid(points) {
        Some(c) => c,
        None => return 0.0,
    };

    let sq = points
        .iter()
        .map(|p| na::distance_squared(p, &c))
        .sum::<f64>();

    (sq / points.len() as f64).sqrt()
}

/// Number of successive displacement pairs pointing against each other.
pub fn direction_reversals(points: &[na::Point2<f64>]) -> usize {
    points
        .windows(3)
        .filter(|w| {
            let v1 = w[1] - w[0];
            let v2 = w[2] - w[1];

            v1.dot(&v2) < 0.0
        })
        .count()
}

pub fn mean<T: Float + FromPrimitive>(values: &[T]) -> T {
    if values.is_empty() {
        return T::zero();
    }

    let n = T::from_usize(values.len()).unwrap_or_else(T::one);
    values.iter().fold(T::zero(), |acc, &v| acc + v) / n
}

/// Population standard deviation.
pub fn std_dev<T: Float + FromPrimitive>(values: &[T]) -> T {
    if values.is_empty() {
        return T::zero();
    }

    let m = mean(values);
    let sq: Vec<T> = values.iter().map(|&v| (v - m) * (v - m)).collect();

    mean(&sq).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(xy: &[(f64, f64)]) -> Vec<na::Point2<f64>> {
        xy.iter().map(|&(x, y)| na::Point2::new(x, y)).collect()
    }

    #[test]
    fn moving_average_shrinks_at_edges() {
        let p = pts(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0), (40.0, 0.0)]);
        let s = moving_average(&p, 5);

        assert_eq!(s.len(), 5);
        assert_relative_eq!(s[0].x, 10.0);
        assert_relative_eq!(s[1].x, 15.0);
        assert_relative_eq!(s[2].x, 20.0);
        assert_relative_eq!(s[3].x, 25.0);
        assert_relative_eq!(s[4].x, 30.0);
    }

    #[test]
    fn moving_average_of_short_input() {
        assert!(moving_average(&[], 5).is_empty());

        let single = pts(&[(3.0, 4.0)]);
        assert_eq!(moving_average(&single, 5), single);
    }

    #[test]
    fn path_and_radius() {
        let square = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);

        assert_relative_eq!(path_length(&square), 6.0);
        assert_eq!(centroid(&square), Some(na::Point2::new(1.0, 1.0)));
        assert_relative_eq!(rms_radius(&square), 2.0f64.sqrt());
        assert_eq!(rms_radius(&[]), 0.0);
    }

    #[test]
    fn counts_reversals() {
        let zigzag = pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(direction_reversals(&zigzag), 2);

        // right angle is not a reversal
        let turn = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(direction_reversals(&turn), 0);
    }

    #[test]
    fn mean_and_std() {
        assert_eq!(mean::<f64>(&[]), 0.0);
        assert_relative_eq!(mean(&[2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 5.0);
        assert_relative_eq!(std_dev(&[2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
        assert_eq!(std_dev::<f32>(&[]), 0.0);
    }
}
