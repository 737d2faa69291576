use qrstep::ecc::{gf_multiply, num_data_codewords};
use qrstep::{
    CodewordRole, EncodeError, EncodeOptions, ErrorCorrectionLevel, Mask, Module, QrSymbol,
    Segment, SegmentMode, Version,
};
use test_case::test_case;

const LEVELS: [ErrorCorrectionLevel; 4] = [
    ErrorCorrectionLevel::Low,
    ErrorCorrectionLevel::Medium,
    ErrorCorrectionLevel::Quartile,
    ErrorCorrectionLevel::High,
];

fn sample_text(len: usize) -> String {
    "Zq9 AB-12 héllo 点".chars().cycle().take(len).collect()
}

#[test]
fn encode_succeeds_or_reports_too_long() {
    let maxversion = Version::new(4);
    for ecl in LEVELS {
        for len in (0..=120).step_by(7) {
            let text = sample_text(len);
            match QrSymbol::encode(&text, ecl, Version::MIN, maxversion) {
                Ok(qr) => {
                    assert!(qr.version() <= maxversion);
                    assert_eq!(qr.size(), qr.version().size());
                    assert!(qr.mask().is_some());
                }
                Err(EncodeError::DataOverCapacity { used, capacity }) => assert!(used > capacity),
                Err(err) => panic!("unexpected {err}"),
            }
        }
    }
}

#[test]
fn version_grows_with_length() {
    let mut last = Version::MIN;
    for len in [1, 20, 50, 100, 200, 400] {
        let qr = QrSymbol::encode(&"a".repeat(len), ErrorCorrectionLevel::Medium, Version::MIN, Version::MAX).unwrap();
        assert!(qr.version() >= last);
        last = qr.version();
    }
}

#[test]
fn min_version_is_respected() {
    let qr = QrSymbol::encode("A", ErrorCorrectionLevel::Low, Version::new(7), Version::new(9)).unwrap();
    assert_eq!(qr.version(), Version::new(7));
    assert!(matches!(qr.module(qr.size() - 11, 0), Module::Function { .. }));
}

#[test]
fn capacity_limit_at_version_one() {
    // 1-L holds 17 bytes in byte mode and not 18.
    let options = EncodeOptions::default().with_version_range(Version::MIN, Version::MIN);
    assert!(QrSymbol::encode_binary(&[b'x'; 17], &options).is_ok());
    let over = QrSymbol::encode_binary(&[b'x'; 18], &options);
    assert_eq!(over.unwrap_err(), EncodeError::DataOverCapacity { used: 156, capacity: 152 });
}

#[test]
fn placed_bits_read_back_in_scan_order() {
    for (text, ecl) in [
        ("HELLO WORLD", ErrorCorrectionLevel::Quartile),
        ("The quick brown fox jumps over the lazy dog 0123456789", ErrorCorrectionLevel::High),
        (&*"mixed 123456789 TEXT ".repeat(12), ErrorCorrectionLevel::Low),
    ] {
        let qr = QrSymbol::encode(text, ecl, Version::MIN, Version::MAX).unwrap();
        let stream: Vec<u8> = qr.codewords().iter().map(|c| c.value).collect();
        assert_eq!(qr.read_codewords(), stream);
    }
}

#[test]
fn every_block_is_a_reed_solomon_codeword() {
    let text = "mixed 123456789 TEXT ".repeat(12);
    let qr = QrSymbol::encode(&text, ErrorCorrectionLevel::Medium, Version::MIN, Version::MAX).unwrap();
    let numblocks = qr.codewords().iter().map(|c| c.block).max().unwrap() + 1;
    assert!(numblocks > 1);
    for block in 0..numblocks {
        let mut word: Vec<(CodewordRole, usize, u8)> = qr
            .codewords()
            .iter()
            .filter(|c| c.block == block)
            .map(|c| (c.role, c.index_in_block, c.value))
            .collect();
        word.sort_by_key(|&(role, index, _)| (role == CodewordRole::Ecc, index));
        let ecclen = word.iter().filter(|w| w.0 == CodewordRole::Ecc).count();
        let mut root: u8 = 1;
        for _ in 0..ecclen {
            let value = word.iter().fold(0u8, |acc, w| gf_multiply(acc, root) ^ w.2);
            assert_eq!(value, 0, "block {block}");
            root = gf_multiply(root, 2);
        }
    }
}

#[test]
fn data_codewords_fill_capacity() {
    for ecl in LEVELS {
        let qr = QrSymbol::encode("capacity", ecl, Version::new(3), Version::MAX).unwrap();
        let data = qr.codewords().iter().filter(|c| c.role == CodewordRole::Data).count();
        assert_eq!(data, num_data_codewords(qr.version(), ecl));
        assert_eq!(qr.codewords().len(), qr.version().num_raw_codewords());
    }
}

#[test]
fn digits_use_numeric_mode() {
    let qr = QrSymbol::encode(
        "31415926535897932384626433832795028841971693993",
        ErrorCorrectionLevel::Quartile,
        Version::MIN,
        Version::MAX,
    )
    .unwrap();
    let modes: Vec<SegmentMode> = qr.segments().iter().map(Segment::mode).collect();
    assert_eq!(modes, [SegmentMode::Numeric]);
}

#[test]
fn hello_world_uses_alphanumeric_mode() {
    let qr = QrSymbol::encode("HELLO WORLD", ErrorCorrectionLevel::Low, Version::MIN, Version::MAX).unwrap();
    assert_eq!(qr.segments().len(), 1);
    assert_eq!(qr.segments()[0].mode(), SegmentMode::Alphanumeric);
    let chosen = Segment::total_bits(qr.segments(), qr.version()).unwrap();
    let bytes = Segment::total_bits(&[Segment::make_bytes(b"HELLO WORLD")], qr.version()).unwrap();
    assert!(chosen < bytes);
}

#[test]
fn empty_text_is_a_byte_segment_in_version_one() {
    let qr = QrSymbol::encode("", ErrorCorrectionLevel::Low, Version::MIN, Version::MAX).unwrap();
    assert_eq!(qr.version(), Version::MIN);
    assert_eq!(qr.segments()[0].mode(), SegmentMode::Byte);
    let remainders = qr.modules().iter().filter(|m| matches!(m, Module::Remainder { .. })).count();
    assert_eq!(remainders, 0);
}

#[test]
fn penalty_scores_are_repeatable() {
    let qr = QrSymbol::encode("repeatable", ErrorCorrectionLevel::Medium, Version::MIN, Version::MAX).unwrap();
    let first = qr.penalty().totals();
    for _ in 0..3 {
        assert_eq!(qr.penalty().totals(), first);
    }
}

/// Largest byte-mode payload of `version` at `ecl`.
fn byte_capacity(version: Version, ecl: ErrorCorrectionLevel) -> usize {
    let header = if version.value() < 10 { 12 } else { 20 };
    (num_data_codewords(version, ecl) * 8 - header) / 8
}

#[test]
fn byte_capacity_boundary_at_every_version() {
    let ecl = ErrorCorrectionLevel::Low;
    assert_eq!(byte_capacity(Version::MIN, ecl), 17);
    assert_eq!(byte_capacity(Version::new(10), ecl), 271);
    assert_eq!(byte_capacity(Version::MAX, ecl), 2953);
    for ver in Version::MIN.value()..=Version::MAX.value() {
        let version = Version::new(ver);
        let n = byte_capacity(version, ecl);
        let exact = EncodeOptions::new(ecl).with_version_range(version, version);
        let qr = QrSymbol::encode_binary(&vec![b'q'; n], &exact).unwrap();
        assert_eq!(qr.version(), version);

        let smallest = QrSymbol::encode_binary(&vec![b'q'; n], &EncodeOptions::new(ecl)).unwrap();
        assert_eq!(smallest.version(), version);

        let over = QrSymbol::encode_binary(&vec![b'q'; n + 1], &exact).unwrap_err();
        let capacity = num_data_codewords(version, ecl) * 8;
        assert!(
            matches!(over, EncodeError::DataOverCapacity { used, capacity: c } if used > c && c == capacity),
            "version {ver}: {over}"
        );
    }
}

#[test]
fn hello_world_1m_reference_symbol() {
    let options = EncodeOptions::new(ErrorCorrectionLevel::Medium)
        .with_version_range(Version::MIN, Version::MIN);
    let qr = QrSymbol::encode_with("HELLO WORLD", &options).unwrap();
    assert_eq!(qr.mask(), Some(Mask::new(0)));

    let totals: Vec<[u32; 4]> = qr.penalties().iter().map(|p| p.totals()).collect();
    assert_eq!(
        totals,
        [
            [172, 99, 800, 0],
            [182, 144, 840, 0],
            [205, 117, 880, 0],
            [196, 147, 800, 0],
            [183, 144, 800, 0],
            [194, 174, 920, 0],
            [186, 129, 840, 0],
            [165, 120, 880, 0],
        ]
    );

    // One row per entry, leftmost module in the highest of the 21 bits.
    let rows: Vec<u32> = (0..qr.size())
        .map(|y| (0..qr.size()).fold(0, |acc, x| (acc << 1) | u32::from(qr.get_module(x, y))))
        .collect();
    assert_eq!(
        rows,
        [
            0x1fc57f, 0x105c41, 0x17455d, 0x17455d, 0x17575d, 0x104e41, 0x1fd57f, 0x000000,
            0x154912, 0x0f1211, 0x03fa58, 0x1eb3ae, 0x09ea75, 0x001445, 0x1fc12c, 0x104c68,
            0x17597f, 0x1746a2, 0x175ee9, 0x10438b, 0x1fdae1,
        ]
    );
}

#[test_case(2, ErrorCorrectionLevel::High, 14, 6, 338, [240, 231, 720, 0])]
#[test_case(5, ErrorCorrectionLevel::Quartile, 60, 6, 698, [392, 390, 800, 0])]
#[test_case(7, ErrorCorrectionLevel::Low, 154, 2, 1054, [547, 531, 920, 0])]
#[test_case(10, ErrorCorrectionLevel::Medium, 213, 6, 1676, [929, 1101, 800, 0])]
#[test_case(21, ErrorCorrectionLevel::High, 403, 3, 5110, [2751, 3528, 1120, 0])]
#[test_case(40, ErrorCorrectionLevel::Low, 2953, 0, 15886, [8162, 11367, 2320, 0])]
fn byte_symbol_reference(
    ver: u8,
    ecl: ErrorCorrectionLevel,
    len: usize,
    mask: u8,
    dark: usize,
    penalty: [u32; 4],
) {
    let version = Version::new(ver);
    let data: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
    let options = EncodeOptions::new(ecl).with_version_range(version, version);
    let qr = QrSymbol::encode_binary(&data, &options).unwrap();
    assert_eq!(qr.mask(), Some(Mask::new(mask)));
    assert_eq!(qr.colors().iter().filter(|&&d| d).count(), dark);
    assert_eq!(qr.penalty().totals(), penalty);
}
