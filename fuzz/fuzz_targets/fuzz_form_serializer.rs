#![no_main]

use libfuzzer_sys::fuzz_target;
use tokio::runtime::Builder;
use tokio_formdata::formdata::{Field, Serializer};
use tokio_formdata::multipart::{self, Boundary};
use tokio_formdata::Error;

fuzz_target!(|data: &[u8]| {
    // Input layout: name, filename and body separated by 0xff bytes
    let mut pieces = data.splitn(3, |&b| b == 0xff);
    let name = String::from_utf8_lossy(pieces.next().unwrap_or_default()).into_owned();
    let filename = pieces
        .next()
        .map(|f| String::from_utf8_lossy(f).into_owned());
    let body = pieces.next().unwrap_or_default().to_vec();

    let rt = Builder::new_current_thread().build().unwrap();

    rt.block_on(async {
        let boundary = Boundary::generate().unwrap();
        let mut output: Vec<u8> = Vec::new();
        let mut form = Serializer::new(multipart::Serializer::new(&mut output, boundary.clone()));

        let field = Field::new(name, filename, multipart::Part::new(body.clone()));
        match form.serialize(field).await {
            Ok(()) => {}
            // Rejected fields must leave nothing behind
            Err(Error::Encoding(_)) => {
                form.finish().await.unwrap();
                drop(form);
                assert_eq!(output, format!("--{}--\r\n", boundary).into_bytes());
                return;
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
        form.finish().await.unwrap();
        drop(form);

        let trailer = format!("\r\n--{}--\r\n", boundary).into_bytes();
        assert!(output.ends_with(&trailer));

        let head_end = output
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("header block terminator");
        let body_start = head_end + 4;
        let body_end = output.len() - trailer.len();
        assert_eq!(&output[body_start..body_end], &body[..]);
    });
});
