//! Color naming: nearest-name lookup and algorithmic descriptive names.
//!
//! [`find_closest_color_names`] ranks a reference [`ColorDictionary`] by
//! CIEDE2000. [`algorithmic_color_naming`] builds names like
//! "muted cool blue" from declarative HSL band tables.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::color::{Lab, Rgb};
use crate::distance::delta_e_2000;
use crate::error::ColorError;
use crate::rules::{Rule, RuleTable};

/// A named reference color. Serializes as `{"name": "...", "hex": "#rrggbb"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedColor {
    pub name: String,
    #[serde(rename = "hex")]
    pub color: Rgb,
}

/// One result of [`find_closest_color_names`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameMatch {
    pub name: String,
    pub color: Rgb,
    pub distance: f64,
}

/// Reference colors with their LAB coordinates precomputed.
#[derive(Debug, Clone)]
pub struct ColorDictionary {
    entries: Vec<NamedColor>,
    labs: Vec<Lab>,
}

impl ColorDictionary {
    pub fn new(entries: Vec<NamedColor>) -> Self {
        let labs = entries.iter().map(|e| e.color.to_lab()).collect();
        Self { entries, labs }
    }

    /// Loads a dictionary from a JSON array of `{"name", "hex"}` objects.
    pub fn from_json(json: &str) -> Result<Self, ColorError> {
        let entries: Vec<NamedColor> = serde_json::from_str(json)
            .map_err(|e| ColorError::Parse(format!("color dictionary: {e}")))?;
        Ok(Self::new(entries))
    }

    /// Common CSS named colors.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_COLORS
                .iter()
                .map(|&(name, hex)| NamedColor {
                    name: name.to_string(),
                    color: Rgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[NamedColor] {
        &self.entries
    }
}

/// Returns up to `top_n` dictionary entries closest to `color`, ascending by
/// ΔE2000 with ties broken by lexical name order.
pub fn find_closest_color_names(
    color: Rgb,
    dictionary: &ColorDictionary,
    top_n: usize,
) -> Vec<NameMatch> {
    let target = color.to_lab();
    let mut matches: Vec<NameMatch> = dictionary
        .entries
        .iter()
        .zip(&dictionary.labs)
        .map(|(entry, &lab)| NameMatch {
            name: entry.name.clone(),
            color: entry.color,
            distance: delta_e_2000(target, lab),
        })
        .collect();
    matches.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.name.cmp(&b.name))
    });
    matches.truncate(top_n);
    matches
}

struct NamingTables {
    achromatic: RuleTable<&'static str>,
    hue: RuleTable<&'static str>,
    temperature: RuleTable<&'static str>,
    modifier: RuleTable<&'static str>,
}

fn naming_tables() -> &'static NamingTables {
    static TABLES: OnceLock<NamingTables> = OnceLock::new();
    TABLES.get_or_init(|| NamingTables {
        achromatic: RuleTable::new(vec![
            Rule::new("black").lightness(0.0, 12.0),
            Rule::new("charcoal").lightness(12.0, 30.0),
            Rule::new("dark gray").lightness(30.0, 45.0),
            Rule::new("gray").lightness(45.0, 65.0),
            Rule::new("light gray").lightness(65.0, 85.0),
            Rule::new("silver").lightness(85.0, 95.0),
            Rule::new("white").lightness(95.0, 100.0),
        ]),
        hue: RuleTable::new(vec![
            Rule::new("brown").hue(15.0, 45.0).lightness(0.0, 35.0),
            Rule::new("red").hue(345.0, 15.0),
            Rule::new("orange").hue(15.0, 45.0),
            Rule::new("yellow").hue(45.0, 70.0),
            Rule::new("lime").hue(70.0, 90.0),
            Rule::new("green").hue(90.0, 150.0),
            Rule::new("teal").hue(150.0, 185.0),
            Rule::new("cyan").hue(185.0, 200.0),
            Rule::new("blue").hue(200.0, 250.0),
            Rule::new("indigo").hue(250.0, 275.0),
            Rule::new("purple").hue(275.0, 300.0),
            Rule::new("magenta").hue(300.0, 330.0),
            Rule::new("pink").hue(330.0, 345.0),
        ]),
        temperature: RuleTable::new(vec![
            Rule::new("warm").hue(330.0, 75.0),
            Rule::new("cool").hue(165.0, 285.0),
        ]),
        modifier: RuleTable::new(vec![
            Rule::new("pale").lightness(85.0, 100.0),
            Rule::new("deep").tier(1).lightness(0.0, 20.0),
            Rule::new("muted").tier(2).saturation(0.0, 35.0),
            Rule::new("vivid").tier(3).saturation(80.0, 100.0).lightness(40.0, 60.0),
            Rule::new("light").tier(4).lightness(65.0, 100.0),
            Rule::new("dark").tier(5).lightness(0.0, 35.0),
        ]),
    })
}

/// Saturation at or below which a color is named on the gray ladder.
const ACHROMATIC_SATURATION: f64 = 10.0;

/// Builds a descriptive name such as "muted cool blue" from HSL components
/// (hue in degrees, saturation and lightness in percent). Out-of-range
/// inputs are clamped first.
pub fn algorithmic_color_naming(h: f64, s: f64, l: f64) -> String {
    let hsl = crate::color::Hsl::new(h, s, l);
    let tables = naming_tables();

    if hsl.s <= ACHROMATIC_SATURATION {
        return tables
            .achromatic
            .classify(hsl.h, hsl.s, hsl.l)
            .unwrap_or(&"gray")
            .to_string();
    }

    [
        tables.modifier.classify(hsl.h, hsl.s, hsl.l),
        tables.temperature.classify(hsl.h, hsl.s, hsl.l),
        tables.hue.classify(hsl.h, hsl.s, hsl.l),
    ]
    .into_iter()
    .flatten()
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
}

const BUILTIN_COLORS: &[(&str, u32)] = &[
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("beige", 0xf5f5dc),
    ("black", 0x000000),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("crimson", 0xdc143c),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkred", 0x8b0000),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("forestgreen", 0x228b22),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("navy", 0x000080),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegreen", 0x98fb98),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("seagreen", 0x2e8b57),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_comes_first_with_zero_distance() {
        let dict = ColorDictionary::builtin();
        let matches = find_closest_color_names(Rgb::new(0x46, 0x82, 0xb4), &dict, 3);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].name, "steelblue");
        assert_eq!(matches[0].distance, 0.0);
    }

    #[test]
    fn results_are_sorted_ascending() {
        let dict = ColorDictionary::builtin();
        let matches = find_closest_color_names(Rgb::new(0x34, 0x98, 0xdb), &dict, 10);
        for pair in matches.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn ties_break_by_name() {
        let dict = ColorDictionary::new(vec![
            NamedColor {
                name: "zeta".into(),
                color: Rgb::new(10, 20, 30),
            },
            NamedColor {
                name: "alpha".into(),
                color: Rgb::new(10, 20, 30),
            },
        ]);
        let matches = find_closest_color_names(Rgb::new(10, 20, 30), &dict, 2);
        assert_eq!(matches[0].name, "alpha");
        assert_eq!(matches[1].name, "zeta");
    }

    #[test]
    fn top_n_larger_than_dictionary_returns_all() {
        let dict = ColorDictionary::builtin();
        let matches = find_closest_color_names(Rgb::BLACK, &dict, 10_000);
        assert_eq!(matches.len(), dict.len());
    }

    #[test]
    fn empty_dictionary_returns_nothing() {
        let dict = ColorDictionary::new(vec![]);
        assert!(dict.is_empty());
        assert!(find_closest_color_names(Rgb::BLACK, &dict, 5).is_empty());
    }

    #[test]
    fn dictionary_loads_from_json() {
        let dict =
            ColorDictionary::from_json(r##"[{"name": "brand", "hex": "#3498db"}]"##).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.entries()[0].color, Rgb::new(0x34, 0x98, 0xdb));
    }

    #[test]
    fn dictionary_rejects_bad_json() {
        assert!(matches!(
            ColorDictionary::from_json(r#"[{"name": "x", "hex": "nope"}]"#),
            Err(ColorError::Parse(_))
        ));
    }

    #[test]
    fn algorithmic_names() {
        assert_eq!(algorithmic_color_naming(210.0, 25.0, 50.0), "muted cool blue");
        assert_eq!(algorithmic_color_naming(0.0, 100.0, 50.0), "vivid warm red");
        assert_eq!(algorithmic_color_naming(30.0, 60.0, 25.0), "dark warm brown");
        assert_eq!(algorithmic_color_naming(120.0, 60.0, 90.0), "pale green");
        assert_eq!(algorithmic_color_naming(120.0, 60.0, 50.0), "green");
    }

    #[test]
    fn achromatic_colors_use_gray_ladder() {
        assert_eq!(algorithmic_color_naming(0.0, 0.0, 0.0), "black");
        assert_eq!(algorithmic_color_naming(200.0, 5.0, 50.0), "gray");
        assert_eq!(algorithmic_color_naming(0.0, 0.0, 100.0), "white");
    }

    #[test]
    fn naming_clamps_out_of_range_input() {
        assert_eq!(
            algorithmic_color_naming(570.0, 25.0, 50.0),
            algorithmic_color_naming(210.0, 25.0, 50.0)
        );
        assert_eq!(algorithmic_color_naming(f64::NAN, -5.0, 200.0), "white");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_color_gets_a_nonempty_name(
                h in 0.0_f64..360.0,
                s in 0.0_f64..=100.0,
                l in 0.0_f64..=100.0,
            ) {
                prop_assert!(!algorithmic_color_naming(h, s, l).is_empty());
            }
        }
    }
}
