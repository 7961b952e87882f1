#![no_main]

use bytes::Bytes;
use futures_util::executor::block_on;
use libfuzzer_sys::fuzz_target;

use binconv::{ConvertOptions, Data, Registry, RepresentationTag, Window};

fuzz_target!(|input: (Vec<u8>, Vec<u8>, u16, Option<u16>)| {
    let (data, cuts, start, length) = input;

    // Split the data at positions derived from the cut bytes
    let mut chunks = Vec::new();
    let mut pos = 0;
    for cut in cuts {
        if pos >= data.len() {
            break;
        }
        let end = (pos + cut as usize + 1).min(data.len());
        chunks.push(Bytes::copy_from_slice(&data[pos..end]));
        pos = end;
    }
    if pos < data.len() {
        chunks.push(Bytes::copy_from_slice(&data[pos..]));
    }

    let mut options = ConvertOptions::new().with_start(start as u64);
    if let Some(length) = length {
        options = options.with_length(length as u64);
    }

    let reg = Registry::new();
    let source = Data::push(futures_util::stream::iter(
        chunks.into_iter().map(Ok::<_, std::io::Error>),
    ));
    let out = block_on(reg.convert(RepresentationTag::MutableByteArray, source, &options))
        .expect("ranged read over an in-memory stream");

    // Verify: stream range equals the slice of the whole input
    let expected = &data[Window::new(start as u64, length.map(u64::from)).clip_usize(data.len())];
    assert_eq!(out.as_bytes(), Some(expected));
});
