use std::io::{Read, Seek, SeekFrom};

use encoding_rs::SHIFT_JIS;

macro_rules! read_number {
    ($func_name:ident, $type: ty) => {
        /// リトルエンディアンで記録された数値を読み込む。
        pub fn $func_name<R>(reader: &mut R) -> std::io::Result<$type>
        where
            R: Read,
        {
            let mut buf = [0u8; std::mem::size_of::<$type>()];
            reader.read_exact(&mut buf)?;

            Ok(<$type>::from_le_bytes(buf))
        }
    };
}

read_number!(read_i16, i16);

/// 指定された位置に記録されている符号付き16ビット整数を読み込む。
///
/// # 引数
///
/// * `source` - 読み込み元
/// * `offset` - ファイルの先頭からのバイト位置
///
/// # 戻り値
///
/// 読み込んだ値
pub fn read_i16_at<R>(source: &mut R, offset: u64) -> std::io::Result<i16>
where
    R: Read + Seek,
{
    source.seek(SeekFrom::Start(offset))?;
    read_i16(source)
}

/// Shift-JISで記録された固定長の文字列を読み込む。
///
/// 読み込んだ文字列は、末尾の空白文字とNULをトリムした結果である。
/// Shift-JISとして解釈できないバイトは置換文字に置き換える。
pub fn read_sjis_str<R>(reader: &mut R, bytes: usize) -> std::io::Result<String>
where
    R: Read,
{
    let mut buf = vec![0u8; bytes];
    reader.read_exact(&mut buf)?;
    let (s, _) = SHIFT_JIS.decode_without_bom_handling(&buf);

    Ok(s.trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string())
}

/// ランダムアクセス可能な読み込み元に対するカーソル
///
/// 読み込み位置を保持して、エラーを報告するときに位置を特定できるようにする。
#[derive(Debug)]
pub struct RecordCursor<R> {
    inner: R,
    position: u64,
}

impl<R> RecordCursor<R>
where
    R: Read + Seek,
{
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// 現在の読み込み位置を返す。
    pub fn position(&self) -> u64 {
        self.position
    }

    /// 指定された位置に移動する。
    pub fn seek_to(&mut self, offset: u64) -> std::io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;

        Ok(())
    }

    /// 指定されたバイト数だけ読み飛ばす。
    pub fn skip(&mut self, bytes: u64) -> std::io::Result<()> {
        self.seek_to(self.position + bytes)
    }

    /// 指定された位置の符号付き16ビット整数を読み込む。
    pub fn read_i16_at(&mut self, offset: u64) -> std::io::Result<i16> {
        self.position = offset;
        let value = read_i16_at(&mut self.inner, offset)?;
        self.position += 2;

        Ok(value)
    }

    /// 現在の位置から符号付き16ビット整数を読み込む。
    pub fn read_i16(&mut self) -> std::io::Result<i16> {
        let value = read_i16(&mut self.inner)?;
        self.position += 2;

        Ok(value)
    }

    /// 現在の位置から`count`個の符号付き16ビット整数を連続して読み込む。
    pub fn read_i16_run(&mut self, count: usize) -> std::io::Result<Vec<i16>> {
        let mut buf = vec![0u8; count * 2];
        self.inner.read_exact(&mut buf)?;
        self.position += buf.len() as u64;

        Ok(buf
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }

    /// 現在の位置からShift-JISの固定長文字列を読み込む。
    pub fn read_sjis_str(&mut self, bytes: usize) -> std::io::Result<String> {
        let s = read_sjis_str(&mut self.inner, bytes)?;
        self.position += bytes as u64;

        Ok(s)
    }
}
