use crate::{algorithms::DetectorKind, keypoint::KeyPoint, keypoint::Rect};

/// Keep the keypoints whose position lies inside the region.
///
/// # Arguments
///
/// * `keypoints` - The detected keypoints.
/// * `region` - The region of interest in pixel coordinates.
///
/// # Returns
///
/// The retained keypoints in their original order.
pub fn retain_in_region(keypoints: &[KeyPoint], region: &Rect) -> Vec<KeyPoint> {
    keypoints
        .iter()
        .filter(|kp| region.contains(kp.x, kp.y))
        .copied()
        .collect()
}

/// Keep at most `max_keypoints` keypoints.
///
/// Shi-Tomasi corners carry no response but are emitted in decreasing quality,
/// so the first ones are kept. For every other detector the keypoints with the
/// highest response are kept, in decreasing response order.
pub fn limit_keypoints(
    keypoints: &mut Vec<KeyPoint>,
    max_keypoints: usize,
    detector: DetectorKind,
) {
    if keypoints.len() <= max_keypoints {
        return;
    }

    if detector != DetectorKind::ShiTomasi {
        keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
    }
    keypoints.truncate(max_keypoints);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_filter_boundaries() {
        let region = Rect::new(535, 180, 180, 150);
        let keypoints = vec![
            KeyPoint::new(535.0, 180.0, 4.0), // top left corner
            KeyPoint::new(715.0, 250.0, 4.0), // right edge
            KeyPoint::new(600.0, 330.0, 4.0), // bottom edge
            KeyPoint::new(600.0, 250.0, 4.0), // inside
            KeyPoint::new(10.0, 10.0, 4.0),   // far away
        ];

        let retained = retain_in_region(&keypoints, &region);
        assert_eq!(retained, vec![keypoints[0], keypoints[3]]);
    }

    #[test]
    fn region_filter_empty() {
        let region = Rect::new(0, 0, 10, 10);
        assert!(retain_in_region(&[], &region).is_empty());
    }

    #[test]
    fn limit_keeps_first_shi_tomasi() {
        let mut keypoints: Vec<KeyPoint> = (0..5)
            .map(|i| KeyPoint::new(i as f32, 0.0, 4.0).with_response(i as f32))
            .collect();
        limit_keypoints(&mut keypoints, 2, DetectorKind::ShiTomasi);
        assert_eq!(keypoints.len(), 2);
        assert_eq!(keypoints[0].x, 0.0);
        assert_eq!(keypoints[1].x, 1.0);
    }

    #[test]
    fn limit_keeps_best_response() {
        let mut keypoints: Vec<KeyPoint> = [3.0, 9.0, 1.0, 7.0]
            .iter()
            .enumerate()
            .map(|(i, r)| KeyPoint::new(i as f32, 0.0, 6.0).with_response(*r))
            .collect();
        limit_keypoints(&mut keypoints, 2, DetectorKind::Fast);
        let responses: Vec<f32> = keypoints.iter().map(|kp| kp.response).collect();
        assert_eq!(responses, vec![9.0, 7.0]);
    }

    #[test]
    fn limit_is_noop_below_cap() {
        let mut keypoints = vec![KeyPoint::new(1.0, 1.0, 6.0)];
        limit_keypoints(&mut keypoints, 50, DetectorKind::Orb);
        assert_eq!(keypoints.len(), 1);
    }
}
