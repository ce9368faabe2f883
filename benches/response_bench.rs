use cookienet::http::chunked::decode_chunked;
use cookienet::http::method::Method;
use cookienet::http::responseparser::parse_response;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn chunked_body(chunks: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for _ in 0..chunks {
        body.extend_from_slice(b"400\r\n");
        body.extend_from_slice(&[b'x'; 0x400]);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(b"0\r\n\r\n");
    body
}

fn benchmark_decode_chunked(c: &mut Criterion) {
    let body = chunked_body(64);

    c.bench_function("decode_chunked_64k", |b| {
        b.iter(|| {
            black_box(decode_chunked(black_box(&body)).unwrap());
        })
    });
}

fn benchmark_parse_response(c: &mut Criterion) {
    let mut raw = b"HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Transfer-Encoding: chunked\r\n\
        Set-Cookie: sid=abc; Path=/\r\n\
        Set-Cookie: theme=dark\r\n\
        Vary: Accept\r\n\
        Vary: Cookie\r\n\r\n"
        .to_vec();
    raw.extend_from_slice(&chunked_body(16));

    c.bench_function("parse_response_chunked", |b| {
        b.iter(|| {
            black_box(parse_response(black_box(&raw), Method::Get).unwrap());
        })
    });
}

criterion_group!(benches, benchmark_decode_chunked, benchmark_parse_response);
criterion_main!(benches);
