//! Interactive questions asked before planning.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::TripRequest;

/// Writes `label`, then reads one line and returns it trimmed.
///
/// Running out of input is an [`io::ErrorKind::UnexpectedEof`] error.
pub async fn prompt<R, W>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(label.as_bytes()).await?;
    output.flush().await?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("input closed at prompt {:?}", label.trim_end()),
        ));
    }
    Ok(line.trim().to_owned())
}

/// Asks for the destination and the travel dates.
pub async fn read_trip_request<R, W>(
    input: &mut R,
    output: &mut W,
) -> io::Result<TripRequest>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let city = prompt(input, output, "Enter destination city: ").await?;
    let start_date =
        prompt(input, output, "Enter start date (YYYY-MM-DD): ").await?;
    let end_date =
        prompt(input, output, "Enter end date (YYYY-MM-DD): ").await?;
    Ok(TripRequest::new(city, start_date, end_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_trip_request() {
        let mut input: &[u8] = b"  Tokyo \n2024-07-01\r\n\t2024-07-03";
        let mut output = vec![];

        let request = read_trip_request(&mut input, &mut output).await.unwrap();
        assert_eq!(
            request,
            TripRequest::new("Tokyo", "2024-07-01", "2024-07-03")
        );
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Enter destination city: Enter start date (YYYY-MM-DD): \
             Enter end date (YYYY-MM-DD): "
        );
    }

    #[tokio::test]
    async fn test_empty_answer_is_accepted() {
        let mut input: &[u8] = b"\n";
        let mut output = vec![];
        let answer = prompt(&mut input, &mut output, "City: ").await.unwrap();
        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn test_eof_is_an_error() {
        let mut input: &[u8] = b"Tokyo\n2024-07-01\n";
        let mut output = vec![];

        let err = read_trip_request(&mut input, &mut output)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(
            err.to_string(),
            "input closed at prompt \"Enter end date (YYYY-MM-DD):\""
        );
    }
}
