//! Variant resolution for the product page.
//!
//! Given a product's ordered options, its variants and the shopper's current
//! choice of one value per option, works out which image to show and which
//! variant (if any) prices the selection. Pure and infallible: the worst
//! outcome is the placeholder image and a "price on request" label.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::domain::aggregates::{ProductDetails, ProductOption, ProductVariant};
use crate::domain::value_objects::Price;

/// Option id -> chosen value id.
pub type Selection = BTreeMap<Uuid, Uuid>;

pub const PLACEHOLDER_IMAGE: &str = "/src/price/placeholder.png";
pub const PRICE_ON_REQUEST: &str = "Цена по запросу";

/// How a selection is compared with a variant's selection key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Every selected value id appears in the variant's key.
    #[default]
    Containment,
    /// The selected value ids and the variant's key are the same set.
    Exact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    OptionValue,
    Main,
    Placeholder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayImage<'a> {
    pub path: &'a str,
    pub source: ImageSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PriceDisplay {
    #[serde(rename_all = "camelCase")]
    Priced { price: Price, old_price: Option<Price>, label: String, old_label: Option<String> },
    OnRequest { label: &'static str },
}

impl PriceDisplay {
    fn for_variant(variant: Option<&ProductVariant>) -> Self {
        match variant {
            Some(v) => Self::Priced {
                price: v.price,
                old_price: v.old_price,
                label: v.price.format_rub(),
                old_label: v.old_price.map(|p| p.format_rub()),
            },
            None => Self::OnRequest { label: PRICE_ON_REQUEST },
        }
    }

    pub fn is_on_request(&self) -> bool { matches!(self, Self::OnRequest { .. }) }
}

/// One selectable value as the purchase UI renders it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChoice<'a> {
    pub value_id: Uuid,
    pub label: &'a str,
    /// Set only when the option renders as colour swatches.
    pub swatch: Option<&'a str>,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChoice<'a> {
    pub option_id: Uuid,
    pub name: &'a str,
    pub values: Vec<ValueChoice<'a>>,
}

/// Everything the product page needs for one selection.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedView<'a> {
    pub selection: Selection,
    pub image: DisplayImage<'a>,
    pub variant: Option<&'a ProductVariant>,
    pub price: PriceDisplay,
    pub options: Vec<OptionChoice<'a>>,
}

#[derive(Clone, Copy, Debug)]
pub struct VariantResolver<'a> {
    options: &'a [ProductOption],
    variants: &'a [ProductVariant],
    main_image: Option<&'a str>,
    rule: MatchRule,
}

impl<'a> VariantResolver<'a> {
    /// Expects `options` (and their values) already in display order.
    pub fn new(options: &'a [ProductOption], variants: &'a [ProductVariant], main_image: Option<&'a str>) -> Self {
        Self { options, variants, main_image, rule: MatchRule::default() }
    }

    pub fn for_product(product: &'a ProductDetails) -> Self {
        Self::new(&product.options, &product.variants, product.product.main_image.as_deref())
    }

    pub fn with_rule(mut self, rule: MatchRule) -> Self {
        self.rule = rule;
        self
    }

    /// First value of every option that has one.
    pub fn default_selection(&self) -> Selection {
        self.options
            .iter()
            .filter_map(|o| o.first_value().map(|v| (o.id, v.id)))
            .collect()
    }

    /// First option (in order) whose selected value carries an image wins;
    /// otherwise the product's main image, otherwise the placeholder.
    pub fn image(&self, selection: &Selection) -> DisplayImage<'a> {
        let from_option = self.options.iter().find_map(|o| {
            let chosen = selection.get(&o.id)?;
            o.value(chosen)?.image()
        });
        if let Some(path) = from_option {
            return DisplayImage { path, source: ImageSource::OptionValue };
        }
        match self.main_image.filter(|s| !s.trim().is_empty()) {
            Some(path) => DisplayImage { path, source: ImageSource::Main },
            None => DisplayImage { path: PLACEHOLDER_IMAGE, source: ImageSource::Placeholder },
        }
    }

    /// First variant in store order that matches the selection.
    pub fn resolve(&self, selection: &Selection) -> Option<&'a ProductVariant> {
        self.variants.iter().find(|v| self.matches(v, selection))
    }

    fn matches(&self, variant: &ProductVariant, selection: &Selection) -> bool {
        let contained = selection.values().all(|id| variant.option_values.contains(id));
        match self.rule {
            MatchRule::Containment => contained,
            MatchRule::Exact => {
                let chosen: BTreeSet<&Uuid> = selection.values().collect();
                let key: BTreeSet<&Uuid> = variant.option_values.ids().iter().collect();
                contained && chosen == key
            }
        }
    }

    pub fn price(&self, selection: &Selection) -> PriceDisplay {
        PriceDisplay::for_variant(self.resolve(selection))
    }

    pub fn choices(&self, selection: &Selection) -> Vec<OptionChoice<'a>> {
        self.options
            .iter()
            .map(|o| {
                let swatches = o.is_color();
                OptionChoice {
                    option_id: o.id,
                    name: &o.name,
                    values: o
                        .values
                        .iter()
                        .map(|v| ValueChoice {
                            value_id: v.id,
                            label: &v.value,
                            swatch: if swatches { v.color_code.as_deref().filter(|c| !c.is_empty()) } else { None },
                            selected: selection.get(&o.id) == Some(&v.id),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    pub fn view(&self, selection: Selection) -> ResolvedView<'a> {
        let variant = self.resolve(&selection);
        ResolvedView {
            image: self.image(&selection),
            price: PriceDisplay::for_variant(variant),
            options: self.choices(&selection),
            variant,
            selection,
        }
    }
}

/// The shopper's in-progress selection on one product page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    selection: Selection,
}

impl SelectionState {
    /// Seeds the selection with the first value of every option.
    pub fn initialize(resolver: &VariantResolver<'_>) -> Self {
        Self { selection: resolver.default_selection() }
    }

    /// Replaces only this option's entry; other choices persist.
    pub fn select(&mut self, option_id: Uuid, value_id: Uuid) {
        self.selection.insert(option_id, value_id);
    }

    pub fn selection(&self) -> &Selection { &self.selection }

    pub fn selected_value_ids(&self) -> Vec<Uuid> { self.selection.values().copied().collect() }

    pub fn reset(&mut self) { self.selection.clear(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::ProductOptionValue;
    use crate::domain::value_objects::SelectionKey;

    struct Fixture {
        options: Vec<ProductOption>,
        variants: Vec<ProductVariant>,
    }

    fn option(name: &str, values: &[(&str, Option<&str>)]) -> ProductOption {
        let id = Uuid::now_v7();
        ProductOption {
            id,
            product_id: Uuid::nil(),
            name: name.into(),
            sort_order: 0,
            values: values
                .iter()
                .enumerate()
                .map(|(i, (label, image))| ProductOptionValue {
                    id: Uuid::now_v7(),
                    option_id: id,
                    value: (*label).into(),
                    color_code: Some(format!("#00000{i}")),
                    image: image.map(Into::into),
                    sort_order: i as i32,
                })
                .collect(),
        }
    }

    fn variant(key: &[Uuid], price: i64, old: Option<i64>) -> ProductVariant {
        ProductVariant {
            id: Uuid::now_v7(),
            product_id: Uuid::nil(),
            option_values: SelectionKey::new(key.to_vec()),
            price: Price::new(price),
            old_price: old.map(Price::new),
            in_stock: true,
        }
    }

    fn id_of(o: &ProductOption, label: &str) -> Uuid {
        o.values.iter().find(|v| v.value == label).map(|v| v.id).unwrap()
    }

    fn iphone() -> Fixture {
        let color = option("Color", &[("Black", None), ("White", None)]);
        let black = id_of(&color, "Black");
        let white = id_of(&color, "White");
        Fixture { variants: vec![variant(&[black], 90000, None), variant(&[white], 95000, Some(99000))], options: vec![color] }
    }

    #[test]
    fn test_iphone_scenario() {
        let f = iphone();
        let r = VariantResolver::new(&f.options, &f.variants, None);
        let color = &f.options[0];
        let mut state = SelectionState::initialize(&r);
        assert_eq!(r.resolve(state.selection()).unwrap().price, Price::new(90000));
        state.select(color.id, id_of(color, "White"));
        assert_eq!(r.resolve(state.selection()).unwrap().price, Price::new(95000));
        match r.price(state.selection()) {
            PriceDisplay::Priced { old_price, old_label, .. } => {
                assert_eq!(old_price, Some(Price::new(99000)));
                assert_eq!(old_label.as_deref(), Some("99\u{a0}000\u{a0}₽"));
            }
            other => panic!("expected a price, got {other:?}"),
        }
    }

    #[test]
    fn test_default_selection_covers_every_option() {
        let options = vec![
            option("Color", &[("Black", None), ("White", None)]),
            option("Memory", &[("128", None), ("256", None)]),
            option("Empty", &[]),
        ];
        let r = VariantResolver::new(&options, &[], None);
        let sel = r.default_selection();
        assert_eq!(sel.len(), 2);
        assert_eq!(sel[&options[0].id], options[0].values[0].id);
        assert_eq!(sel[&options[1].id], options[1].values[0].id);
    }

    #[test]
    fn test_full_key_selects_that_variant() {
        let color = option("Color", &[("Black", None), ("White", None)]);
        let memory = option("Memory", &[("128", None), ("256", None)]);
        let mut variants = Vec::new();
        for c in &color.values {
            for m in &memory.values {
                variants.push(variant(&[c.id, m.id], 1000, None));
            }
        }
        let options = vec![color, memory];
        let r = VariantResolver::new(&options, &variants, None);
        for v in &variants {
            let sel: Selection = [(options[0].id, v.option_values.ids()[0]), (options[1].id, v.option_values.ids()[1])].into();
            assert_eq!(r.resolve(&sel).map(|m| m.id), Some(v.id));
            assert_eq!(r.with_rule(MatchRule::Exact).resolve(&sel).map(|m| m.id), Some(v.id));
        }
    }

    #[test]
    fn test_unmatched_selection_is_price_on_request() {
        let color = option("Color", &[("Black", None), ("White", None)]);
        let memory = option("Memory", &[("128", None), ("256", None)]);
        let black = id_of(&color, "Black");
        let m128 = id_of(&memory, "128");
        let variants = vec![variant(&[black, m128], 90000, None)];
        let options = vec![color, memory];
        let r = VariantResolver::new(&options, &variants, None);
        let mut state = SelectionState::initialize(&r);
        assert!(r.resolve(state.selection()).is_some());
        state.select(options[1].id, id_of(&options[1], "256"));
        assert!(r.resolve(state.selection()).is_none());
        assert_eq!(r.price(state.selection()), PriceDisplay::OnRequest { label: PRICE_ON_REQUEST });
        assert!(r.price(state.selection()).is_on_request());
    }

    #[test]
    fn test_short_key_never_matches_a_fuller_selection() {
        let color = option("Color", &[("Black", None)]);
        let memory = option("Memory", &[("128", None)]);
        let variants = vec![variant(&[color.values[0].id], 90000, None)];
        let options = vec![color, memory];
        let r = VariantResolver::new(&options, &variants, None);
        assert!(r.resolve(&r.default_selection()).is_none());
    }

    #[test]
    fn test_containment_versus_exact() {
        let color = option("Color", &[("Black", None)]);
        let memory = option("Memory", &[("128", None)]);
        let variants = vec![variant(&[color.values[0].id, memory.values[0].id], 90000, None)];
        let partial: Selection = [(color.id, color.values[0].id)].into();
        let options = vec![color, memory];
        let r = VariantResolver::new(&options, &variants, None);
        assert!(r.resolve(&partial).is_some());
        assert!(r.with_rule(MatchRule::Exact).resolve(&partial).is_none());
    }

    #[test]
    fn test_first_matching_variant_wins() {
        let color = option("Color", &[("Black", None)]);
        let black = color.values[0].id;
        let variants = vec![variant(&[black], 1, None), variant(&[black], 2, None)];
        let options = vec![color];
        let r = VariantResolver::new(&options, &variants, None);
        assert_eq!(r.resolve(&r.default_selection()).unwrap().price, Price::new(1));
    }

    #[test]
    fn test_no_options_uses_first_variant() {
        let variants = vec![variant(&[], 5000, None)];
        let r = VariantResolver::new(&[], &variants, None);
        assert_eq!(r.price(&Selection::new()), PriceDisplay::Priced {
            price: Price::new(5000), old_price: None, label: "5\u{a0}000\u{a0}₽".into(), old_label: None,
        });
    }

    #[test]
    fn test_image_first_option_wins() {
        let color = option("Color", &[("Black", Some("/img/black.png")), ("White", None)]);
        let finish = option("Finish", &[("Matte", Some("/img/matte.png"))]);
        let options = vec![color, finish];
        let r = VariantResolver::new(&options, &[], Some("/img/main.png"));
        let mut state = SelectionState::initialize(&r);
        assert_eq!(r.image(state.selection()), DisplayImage { path: "/img/black.png", source: ImageSource::OptionValue });

        // White has no image, so the next option's image is used.
        state.select(options[0].id, id_of(&options[0], "White"));
        assert_eq!(r.image(state.selection()).path, "/img/matte.png");
    }

    #[test]
    fn test_image_falls_back_to_main_then_placeholder() {
        let options = vec![option("Size", &[("S", None)])];
        let sel = VariantResolver::new(&options, &[], None).default_selection();
        let with_main = VariantResolver::new(&options, &[], Some("/img/main.png"));
        assert_eq!(with_main.image(&sel), DisplayImage { path: "/img/main.png", source: ImageSource::Main });
        let without = VariantResolver::new(&options, &[], Some(""));
        assert_eq!(without.image(&sel), DisplayImage { path: PLACEHOLDER_IMAGE, source: ImageSource::Placeholder });
    }

    #[test]
    fn test_unknown_ids_are_tolerated() {
        let f = iphone();
        let r = VariantResolver::new(&f.options, &f.variants, None);
        let sel: Selection = [(f.options[0].id, Uuid::now_v7())].into();
        assert!(r.resolve(&sel).is_none());
        assert_eq!(r.image(&sel).source, ImageSource::Placeholder);
    }

    #[test]
    fn test_choices_mark_selection_and_swatches() {
        let f = iphone();
        let sizes = option("Size", &[("S", None)]);
        let options = vec![f.options[0].clone(), sizes];
        let r = VariantResolver::new(&options, &f.variants, None);
        let view = r.view(r.default_selection());
        assert_eq!(view.options.len(), 2);
        assert!(view.options[0].values[0].selected);
        assert!(!view.options[0].values[1].selected);
        assert_eq!(view.options[0].values[0].swatch, Some("#000000"));
        assert_eq!(view.options[1].values[0].swatch, None);
        assert_eq!(view.variant.unwrap().price, Price::new(90000));
    }

    #[test]
    fn test_state_reset() {
        let f = iphone();
        let r = VariantResolver::new(&f.options, &f.variants, None);
        let mut state = SelectionState::initialize(&r);
        assert_eq!(state.selected_value_ids().len(), 1);
        state.reset();
        assert!(state.selection().is_empty());
    }
}
