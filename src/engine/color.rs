const CLOSE_THRESHOLD: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb
{
    pub const fn new(r: u8, g: u8, b: u8) -> Self
    {
        Self { r, g, b }
    }

    /// Builds a color from unbounded channel values, clamping each to [0, 255].
    pub fn clamped(r: i32, g: i32, b: i32) -> Self
    {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Hue in degrees, in [0, 360). Grays have hue 0.
    pub fn hue(self) -> f64
    {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        if max == min {
            return 0.0;
        }

        let delta = max - min;
        let h = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        h * 60.0
    }
}

fn clamp_channel(value: i32) -> u8
{
    value.clamp(0, 255) as u8
}

/// Euclidean distance between two colors in raw RGB space.
pub fn color_distance(a: Rgb, b: Rgb) -> f64
{
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickClass
{
    Perfect,
    Close,
    Wrong,
}

impl PickClass
{
    pub fn from_distance(distance: f64) -> Self
    {
        if distance == 0.0 {
            PickClass::Perfect
        } else if distance < CLOSE_THRESHOLD {
            PickClass::Close
        } else {
            PickClass::Wrong
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn clamped_saturates_both_ends()
    {
        assert_eq!(Rgb::clamped(-12, 128, 300), Rgb::new(0, 128, 255));
    }

    #[test]
    fn distance_to_self_is_zero()
    {
        let c = Rgb::new(17, 200, 3);
        assert_eq!(color_distance(c, c), 0.0);
    }

    #[test]
    fn distance_is_euclidean_and_symmetric()
    {
        let a = Rgb::new(10, 10, 10);
        let b = Rgb::new(13, 14, 10);
        assert_eq!(color_distance(a, b), 5.0);
        assert_eq!(color_distance(b, a), 5.0);
    }

    #[test]
    fn classification_boundaries()
    {
        assert_eq!(PickClass::from_distance(0.0), PickClass::Perfect);
        assert_eq!(PickClass::from_distance(0.001), PickClass::Close);
        assert_eq!(PickClass::from_distance(9.999), PickClass::Close);
        assert_eq!(PickClass::from_distance(10.0), PickClass::Wrong);
        assert_eq!(PickClass::from_distance(250.0), PickClass::Wrong);
    }

    #[test]
    fn hue_of_primaries_and_grays()
    {
        assert_eq!(Rgb::new(255, 0, 0).hue(), 0.0);
        assert_eq!(Rgb::new(0, 255, 0).hue(), 120.0);
        assert_eq!(Rgb::new(0, 0, 255).hue(), 240.0);
        assert_eq!(Rgb::new(90, 90, 90).hue(), 0.0);
    }

    #[test]
    fn hue_wraps_red_with_blue_excess()
    {
        // magenta-leaning red: g < b pushes the hue into the upper range
        let hue = Rgb::new(255, 0, 128).hue();
        assert!(hue > 300.0 && hue < 360.0, "hue={hue}");
    }
}
