use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use pretty_assertions::assert_eq;
use uuid::Uuid;
use uuid_feature_set::{
    FactoryError, FeatureOptions, FeatureSet, Strategy, VariantKind,
    builder::{
        DefaultBuilder, DegradedDefaultBuilder, DegradedGuidBuilder, DegradedNonstandardBuilder,
        GuidBuilder, NonstandardBuilder,
    },
    capability::{DetectedEnvironment, FixedCapabilityProbe},
    codec::{GuidStringCodec, StringCodec},
    converter::{ConversionError, GenericTimeConverter, NativeTimeConverter, TimeConverter},
    generator::{DefaultTimeGenerator, select_time_generator},
    node::{
        HardwareAddressSource, Node, NodeError, NodeProvider, RandomNodeProvider,
        SystemNodeProvider,
    },
    random::{RandomError, RandomGenerator, SeededRandomGenerator},
    time::{FixedTimeProvider, TimeProvider},
    types::{Hexadecimal, Time},
    uuid_factory::UuidFactory,
};

const SENTINEL: Time = Time::new(1_234_567_890, 123_456);

/// Counts discovery calls and reports a fixed address.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

impl CountingSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HardwareAddressSource for CountingSource {
    fn hardware_addresses(&self) -> Result<Vec<String>, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["08:00:20:0c:9a:66".to_string()])
    }
}

/// Discovery always fails.
struct FailingSource;

impl HardwareAddressSource for FailingSource {
    fn hardware_addresses(&self) -> Result<Vec<String>, NodeError> {
        Err(NodeError::Discovery("no interfaces".to_string()))
    }
}

struct PanickingNodeProvider;

impl Strategy for PanickingNodeProvider {
    fn kind(&self) -> VariantKind {
        VariantKind::Single("PanickingNodeProvider")
    }
}

impl NodeProvider for PanickingNodeProvider {
    fn get_node(&self) -> Result<Node, NodeError> {
        panic!("node provider must not be called");
    }
}

struct PanickingTimeConverter;

impl Strategy for PanickingTimeConverter {
    fn kind(&self) -> VariantKind {
        VariantKind::Single("PanickingTimeConverter")
    }
}

impl TimeConverter for PanickingTimeConverter {
    fn calculate_time(&self, _time: Time) -> Result<Hexadecimal, ConversionError> {
        panic!("time converter must not be called");
    }

    fn convert_time(&self, _timestamp: &Hexadecimal) -> Result<Time, ConversionError> {
        panic!("time converter must not be called");
    }
}

struct PanickingTimeProvider;

impl TimeProvider for PanickingTimeProvider {
    fn current_time(&self) -> Time {
        panic!("time provider must not be called");
    }
}

struct ClosedRandom;

impl Strategy for ClosedRandom {
    fn kind(&self) -> VariantKind {
        VariantKind::Single("ClosedRandom")
    }
}

impl RandomGenerator for ClosedRandom {
    fn generate(&self, _length: usize) -> Result<Vec<u8>, RandomError> {
        Err(RandomError::Unavailable("no entropy source".to_string()))
    }
}

fn fixed_host(is_64bit: bool) -> Arc<FixedCapabilityProbe> {
    Arc::new(FixedCapabilityProbe::new(DetectedEnvironment {
        is_64bit,
        big_number_library_available: true,
        gmp_library_available: false,
        native_generator_available: true,
    }))
}

fn features(is_64bit: bool, options: FeatureOptions) -> FeatureSet {
    FeatureSet::builder()
        .probe(fixed_host(is_64bit))
        .options(options)
        .hardware_address_source(Arc::new(CountingSource::default()))
        .build()
        .unwrap()
}

fn kinds(features: &FeatureSet) -> Vec<VariantKind> {
    vec![
        features.calculator().kind(),
        features.number_converter().kind(),
        features.time_converter().kind(),
        features.uuid_builder().kind(),
        features.codec().kind(),
        features.node_provider().kind(),
        features.random_generator().kind(),
        features.time_generator().kind(),
        features.validator().kind(),
    ]
}

fn all_options() -> Vec<FeatureOptions> {
    let mut all = vec![];
    for bits in 0_u8..64 {
        all.push(FeatureOptions {
            use_guid_layout: bits & 0x01 != 0,
            force_32bit: bits & 0x02 != 0,
            force_no_big_number: bits & 0x04 != 0,
            force_no_gmp: bits & 0x08 != 0,
            ignore_system_node: bits & 0x10 != 0,
            enable_native_generator: bits & 0x20 != 0,
        });
    }
    all
}

#[test_log::test]
fn test_selection_matches_decision_table_for_every_flag_combination() {
    for detected_64bit in [true, false] {
        for options in all_options() {
            let features = features(detected_64bit, options);
            let is_64bit = detected_64bit && !options.force_32bit;
            let context = format!("detected_64bit={detected_64bit} options={options:?}");

            let expected_builder = match (is_64bit, options.use_guid_layout) {
                (true, true) => GuidBuilder::KIND,
                (true, false) => {
                    VariantKind::chain([DefaultBuilder::KIND, NonstandardBuilder::KIND])
                }
                (false, true) => DegradedGuidBuilder::KIND,
                (false, false) => VariantKind::chain([
                    DegradedDefaultBuilder::KIND,
                    DegradedNonstandardBuilder::KIND,
                ]),
            };
            let expected_codec = if options.use_guid_layout {
                GuidStringCodec::KIND
            } else {
                StringCodec::KIND
            };
            let expected_time_converter = if is_64bit {
                NativeTimeConverter::KIND
            } else {
                GenericTimeConverter::KIND
            };

            assert_eq!(features.capabilities().is_64bit, is_64bit, "{context}");
            assert_eq!(features.uuid_builder().kind(), expected_builder, "{context}");
            assert_eq!(features.codec().kind(), expected_codec, "{context}");
            assert_eq!(
                features.time_converter().kind(),
                expected_time_converter,
                "{context}"
            );
            assert!(
                Arc::ptr_eq(features.codec().builder(), features.uuid_builder()),
                "{context}"
            );

            if !is_64bit {
                assert!(!features.uuid_builder().requires_64bit(), "{context}");
                assert!(!features.codec().requires_64bit(), "{context}");
                assert!(!features.time_converter().requires_64bit(), "{context}");
                assert!(!features.time_generator().requires_64bit(), "{context}");
            }
        }
    }
}

#[test_log::test]
fn test_identical_flags_select_identical_variants() {
    for detected_64bit in [true, false] {
        for options in all_options() {
            assert_eq!(
                kinds(&features(detected_64bit, options)),
                kinds(&features(detected_64bit, options)),
                "detected_64bit={detected_64bit} options={options:?}"
            );
        }
    }
}

#[test_log::test]
fn test_64bit_default_layout_uses_builder_chain_wrapped_by_string_codec() {
    let features = features(true, FeatureOptions::new());

    assert_eq!(
        features.uuid_builder().kind(),
        VariantKind::chain([DefaultBuilder::KIND, NonstandardBuilder::KIND])
    );
    assert_eq!(features.codec().kind(), StringCodec::KIND);
    assert!(Arc::ptr_eq(features.codec().builder(), features.uuid_builder()));
}

#[test_log::test]
fn test_32bit_guid_layout_uses_degraded_guid_builder() {
    let features = features(false, FeatureOptions::new().with_guid_layout(true));

    assert_eq!(features.uuid_builder().kind(), DegradedGuidBuilder::KIND);
    assert_eq!(features.codec().kind(), GuidStringCodec::KIND);
    assert!(Arc::ptr_eq(features.codec().builder(), features.uuid_builder()));
}

#[test_log::test]
fn test_conservative_probe_selects_degraded_variants() {
    let features = FeatureSet::builder()
        .probe(Arc::new(FixedCapabilityProbe::conservative()))
        .options(FeatureOptions::new().with_native_generator(true))
        .build()
        .unwrap();

    assert!(!features.capabilities().is_64bit);
    assert!(!features.capabilities().native_generator_enabled);
    assert_eq!(features.time_generator().kind(), DefaultTimeGenerator::KIND);
    assert_eq!(
        features.uuid_builder().kind(),
        VariantKind::chain([
            DegradedDefaultBuilder::KIND,
            DegradedNonstandardBuilder::KIND
        ])
    );
}

#[test_log::test]
fn test_set_time_provider_rebuilds_only_time_generator() {
    let mut features = features(true, FeatureOptions::new().with_ignore_system_node(true));
    let builder = Arc::clone(features.uuid_builder());
    let codec = Arc::clone(features.codec());
    let node_provider = Arc::clone(features.node_provider());
    let time_converter = Arc::clone(features.time_converter());
    let previous_generator = Arc::clone(features.time_generator());

    features.set_time_provider(Arc::new(FixedTimeProvider::new(SENTINEL)));

    assert!(!Arc::ptr_eq(features.time_generator(), &previous_generator));
    assert!(Arc::ptr_eq(features.uuid_builder(), &builder));
    assert!(Arc::ptr_eq(features.codec(), &codec));
    assert!(Arc::ptr_eq(features.node_provider(), &node_provider));
    assert!(Arc::ptr_eq(features.time_converter(), &time_converter));
    assert_eq!(features.time_provider().current_time(), SENTINEL);

    let bytes = features.time_generator().generate(None, None).unwrap();
    let (seconds, nanos) = Uuid::from_bytes(bytes)
        .get_timestamp()
        .unwrap()
        .to_unix();

    assert_eq!(seconds, 1_234_567_890);
    assert_eq!(nanos, 123_456_000);
}

#[test_log::test]
fn test_ignore_system_node_never_discovers() {
    let source = Arc::new(CountingSource::default());

    let features = FeatureSet::builder()
        .probe(fixed_host(true))
        .options(FeatureOptions::new().with_ignore_system_node(true))
        .hardware_address_source(Arc::clone(&source) as Arc<dyn HardwareAddressSource>)
        .time_provider(Arc::new(FixedTimeProvider::new(SENTINEL)))
        .build()
        .unwrap();

    assert_eq!(features.node_provider().kind(), RandomNodeProvider::KIND);

    let node = features.node_provider().get_node().unwrap();
    features.time_generator().generate(None, None).unwrap();

    assert!(node.is_multicast());
    assert_eq!(source.calls(), 0);
}

#[test_log::test]
fn test_system_node_discovered_once_and_reused() {
    let source = Arc::new(CountingSource::default());

    let features = FeatureSet::builder()
        .probe(fixed_host(true))
        .hardware_address_source(Arc::clone(&source) as Arc<dyn HardwareAddressSource>)
        .build()
        .unwrap();

    assert_eq!(
        features.node_provider().kind(),
        VariantKind::chain([SystemNodeProvider::KIND, RandomNodeProvider::KIND])
    );
    assert_eq!(source.calls(), 0);

    let first = features.node_provider().get_node().unwrap();
    let second = features.node_provider().get_node().unwrap();

    assert_eq!(first.to_string(), "0800200c9a66");
    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
}

#[test_log::test]
fn test_failed_discovery_falls_back_to_random_node() {
    let features = FeatureSet::builder()
        .probe(fixed_host(true))
        .hardware_address_source(Arc::new(FailingSource))
        .build()
        .unwrap();

    let node = features.node_provider().get_node().unwrap();

    assert!(node.is_multicast());
}

#[cfg(feature = "native-generator")]
#[test_log::test]
fn test_native_generator_bypasses_node_provider_and_time_converter() {
    use uuid_feature_set::generator::NativeTimeGenerator;

    let features = features(true, FeatureOptions::new().with_native_generator(true));
    assert!(features.capabilities().native_generator_enabled);
    assert_eq!(features.time_generator().kind(), NativeTimeGenerator::KIND);

    let node_provider: Arc<dyn NodeProvider> = Arc::new(PanickingNodeProvider);
    let time_converter: Arc<dyn TimeConverter> = Arc::new(PanickingTimeConverter);
    let time_provider: Arc<dyn TimeProvider> = Arc::new(PanickingTimeProvider);

    let generator = select_time_generator(
        features.capabilities(),
        &node_provider,
        &time_converter,
        &time_provider,
    );

    let first = Uuid::from_bytes(generator.generate(None, None).unwrap());
    let second = Uuid::from_bytes(generator.generate(None, Some(0x0123)).unwrap());

    assert_eq!(generator.kind(), NativeTimeGenerator::KIND);
    assert_eq!(first.get_version_num(), 1);
    assert_eq!(second.get_version_num(), 1);
}

#[test_log::test]
fn test_generic_generator_is_built_from_given_roles() {
    let features = features(true, FeatureOptions::new());
    assert!(!features.capabilities().native_generator_enabled);

    let node_provider: Arc<dyn NodeProvider> = Arc::new(PanickingNodeProvider);
    let time_converter: Arc<dyn TimeConverter> = Arc::new(PanickingTimeConverter);
    let time_provider: Arc<dyn TimeProvider> = Arc::new(PanickingTimeProvider);

    let generator = select_time_generator(
        features.capabilities(),
        &node_provider,
        &time_converter,
        &time_provider,
    );

    assert_eq!(generator.kind(), DefaultTimeGenerator::KIND);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        generator.generate(Some(Node::from_bytes([1, 2, 3, 4, 5, 6])), Some(0))
    }));

    assert!(outcome.is_err());
}

#[test_log::test]
fn test_guid_layout_decodes_nil_and_max() {
    for is_64bit in [true, false] {
        let factory = UuidFactory::new(features(
            is_64bit,
            FeatureOptions::new()
                .with_guid_layout(true)
                .with_ignore_system_node(true),
        ));

        for (encoded, expected) in [
            ("00000000-0000-0000-0000-000000000000", Uuid::nil()),
            ("ffffffff-ffff-ffff-ffff-ffffffffffff", Uuid::from_u128(u128::MAX)),
            ("{00000000-0000-0000-0000-000000000000}", Uuid::nil()),
        ] {
            assert!(factory.is_valid(encoded), "{encoded}");
            assert_eq!(factory.from_string(encoded).unwrap(), expected, "{encoded}");
        }
    }
}

#[test_log::test]
fn test_missing_secure_random_fails_whole_build() {
    let source = Arc::new(CountingSource::default());

    let outcome = FeatureSet::builder()
        .probe(fixed_host(true))
        .hardware_address_source(Arc::clone(&source) as Arc<dyn HardwareAddressSource>)
        .random_generator(Arc::new(ClosedRandom))
        .build();

    match outcome {
        Err(FactoryError::NoSecureRandom(e)) => {
            assert_eq!(e, RandomError::Unavailable("no entropy source".to_string()));
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(features) => panic!("assembled despite missing random source: {features:?}"),
    }
    assert_eq!(source.calls(), 0);
}

#[test_log::test]
fn test_injected_random_generator_is_kept() {
    let random: Arc<dyn RandomGenerator> = Arc::new(SeededRandomGenerator::new(7));

    let features = FeatureSet::builder()
        .probe(fixed_host(false))
        .options(FeatureOptions::new().with_ignore_system_node(true))
        .random_generator(Arc::clone(&random))
        .build()
        .unwrap();

    assert!(Arc::ptr_eq(features.random_generator(), &random));
    assert_eq!(features.random_generator().kind(), SeededRandomGenerator::KIND);
}
