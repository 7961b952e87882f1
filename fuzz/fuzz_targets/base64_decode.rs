#![no_main]

use futures_util::TryStreamExt;
use futures_util::executor::block_on;
use libfuzzer_sys::fuzz_target;

use binconv::{ConvertOptions, Data, Registry, RepresentationTag};

fuzz_target!(|input: (String, u16, u16, u8)| {
    let (encoded, start, length, buffer) = input;
    let reg = Registry::new();
    let options = ConvertOptions::new()
        .with_src_string_type(RepresentationTag::Base64Text)
        .with_buffer_size(buffer as usize + 1)
        .with_range(start as u64, length as u64);

    // Arbitrary input must fail cleanly, never panic
    let whole = block_on(reg.convert(
        RepresentationTag::MutableByteArray,
        Data::text(encoded.clone()),
        &options,
    ));
    let streamed = block_on(async {
        let stream = reg
            .convert(RepresentationTag::PushStream, Data::text(encoded), &options)
            .await?
            .into_push()
            .expect("push stream");
        let chunks: Vec<bytes::Bytes> = stream.try_collect().await?;
        Ok::<_, binconv::ConvertError>(chunks.concat())
    });

    // Verify: when both succeed, streaming and whole decoding agree
    if let (Ok(whole), Ok(streamed)) = (whole, streamed) {
        assert_eq!(whole.as_bytes(), Some(&streamed[..]));
    }
});
