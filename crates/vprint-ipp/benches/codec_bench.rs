// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for request decoding, response encoding and full
// dispatch in the vprint-ipp crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use vprint_core::config::PrinterCatalog;
use vprint_ipp::{
    Attribute, Collection, DelimiterTag, Dispatcher, Group, Operation, Request, Response,
    StatusCode, Value, ValueTag, Version, decode_request, encode_request, encode_response,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn operation_group() -> Group {
    Group::operation_attributes().with(Attribute::uri(
        "printer-uri",
        "ipp://localhost:631/ipp/print",
    ))
}

fn get_printer_attributes(requested: &[&str]) -> Vec<u8> {
    let mut group = operation_group();
    if !requested.is_empty() {
        group.push(Attribute::keywords("requested-attributes", requested.iter().copied()));
    }
    let request =
        Request::new(Version::V1_1, Operation::GetPrinterAttributes, 42).with_group(group);
    encode_request(&request).expect("encode request")
}

fn print_job(document: Vec<u8>) -> Vec<u8> {
    let media = Collection::new()
        .with(
            "media-size",
            ValueTag::BegCollection,
            Value::Collection(
                Collection::new()
                    .with("x-dimension", ValueTag::Integer, Value::Integer(21000))
                    .with("y-dimension", ValueTag::Integer, Value::Integer(29700)),
            ),
        )
        .with("media-type", ValueTag::Keyword, Value::text("stationery"));

    let request = Request::new(Version::V2_0, Operation::PrintJob, 100)
        .with_group(operation_group().with(Attribute::name_value("job-name", "Benchmark Print Job")))
        .with_group(
            Group::new(DelimiterTag::JobAttributes)
                .with(Attribute::integer("copies", 2))
                .with(
                    Attribute::with_values(ValueTag::BegCollection, "media-col", [Value::Collection(media)])
                        .expect("media-col"),
                ),
        )
        .with_document(document);
    encode_request(&request).expect("encode request")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_decode_request(c: &mut Criterion) {
    let data = get_printer_attributes(&[]);
    c.bench_function("decode_request (minimal)", |b| {
        b.iter(|| {
            let result = decode_request(black_box(&data));
            assert!(result.is_ok());
        });
    });

    // Nested collections plus a document payload.
    let data_with_doc = print_job(vec![0xAB; 4096]);
    c.bench_function("decode_request (collection + 4 KiB document)", |b| {
        b.iter(|| {
            let result = decode_request(black_box(&data_with_doc));
            assert!(result.is_ok());
        });
    });
}

fn bench_encode_response(c: &mut Criterion) {
    let dispatcher = Dispatcher::from_catalog(PrinterCatalog::default());
    let attributes = dispatcher
        .inspect(|printer| printer.attributes())
        .expect("printer lock");
    let response = Response::new(StatusCode::SuccessfulOk, 1)
        .with_group(Group::operation_attributes())
        .with_group({
            let mut group = Group::new(DelimiterTag::PrinterAttributes);
            group.attributes_mut().extend(attributes);
            group
        });

    c.bench_function("encode_response (full printer projection)", |b| {
        b.iter(|| {
            let bytes = encode_response(black_box(&response));
            black_box(bytes)
        });
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = Dispatcher::from_catalog(PrinterCatalog::default());
    let all = decode_request(&get_printer_attributes(&[])).expect("decode");
    let filtered =
        decode_request(&get_printer_attributes(&["printer-name", "printer-state", "bogus"]))
            .expect("decode");

    c.bench_function("dispatch Get-Printer-Attributes (all)", |b| {
        b.iter(|| black_box(dispatcher.process(black_box(&all))));
    });
    c.bench_function("dispatch Get-Printer-Attributes (filtered)", |b| {
        b.iter(|| black_box(dispatcher.process(black_box(&filtered))));
    });

    // Includes SHA-256 of the document.
    let job = decode_request(&print_job(vec![0x42; 1024 * 1024])).expect("decode");
    c.bench_function("dispatch Print-Job (1 MiB document)", |b| {
        b.iter(|| black_box(dispatcher.process(black_box(&job))));
    });
}

criterion_group!(
    benches,
    bench_decode_request,
    bench_encode_response,
    bench_dispatch,
);
criterion_main!(benches);
