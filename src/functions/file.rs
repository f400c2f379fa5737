//! File, download and INI helpers.

use crate::Result;
use crate::decode::parse_string_list;
use crate::gateway::{CallGateway, Dispatch};

/// File, download and INI helpers executed by the automation object.
///
/// The `*_pwd` variants operate on INI files encrypted with `password`.
pub struct FileFunctions<'a, D> {
    gateway: &'a CallGateway<D>,
}

impl<'a, D: Dispatch> FileFunctions<'a, D> {
    pub fn new(gateway: &'a CallGateway<D>) -> Self {
        Self { gateway }
    }

    pub fn decode_file(&self, file: &str, password: &str) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("DecodeFile", &mut crate::args![file, password])?)
    }

    pub fn encode_file(&self, file: &str, password: &str) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("EncodeFile", &mut crate::args![file, password])?)
    }

    /// Delete `key` from `section`, or the whole section when `key` is
    /// empty.
    pub fn delete_ini(&self, section: &str, key: &str, file: &str) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("DeleteIni", &mut crate::args![section, key, file])?)
    }

    pub fn delete_ini_pwd(&self, section: &str, key: &str, file: &str, password: &str) -> Result<()> {
        Ok(self.gateway.call_expect_1(
            "DeleteIniPwd",
            &mut crate::args![section, key, file, password],
        )?)
    }

    /// Download `url` to `save_file`. Returns 1 on success, 0 on failure
    /// and -1 on timeout.
    pub fn download_file(&self, url: &str, save_file: &str, timeout_ms: i64) -> Result<i32> {
        Ok(self.gateway.call_for_i32(
            "DownloadFile",
            &mut crate::args![url, save_file, timeout_ms],
        )?)
    }

    pub fn enum_ini_key(&self, section: &str, file: &str) -> Result<Vec<String>> {
        let result = self
            .gateway
            .call_for_string("EnumIniKey", &mut crate::args![section, file])?;
        Ok(parse_string_list(result.as_str()))
    }

    pub fn enum_ini_key_pwd(&self, section: &str, file: &str, password: &str) -> Result<Vec<String>> {
        let result = self.gateway.call_for_string(
            "EnumIniKeyPwd",
            &mut crate::args![section, file, password],
        )?;
        Ok(parse_string_list(result.as_str()))
    }

    pub fn enum_ini_section(&self, file: &str) -> Result<Vec<String>> {
        let result = self
            .gateway
            .call_for_string("EnumIniSection", &mut crate::args![file])?;
        Ok(parse_string_list(result.as_str()))
    }

    pub fn enum_ini_section_pwd(&self, file: &str, password: &str) -> Result<Vec<String>> {
        let result = self
            .gateway
            .call_for_string("EnumIniSectionPwd", &mut crate::args![file, password])?;
        Ok(parse_string_list(result.as_str()))
    }

    /// Size of `file` in bytes.
    pub fn file_length(&self, file: &str) -> Result<i64> {
        Ok(self
            .gateway
            .call_for_int("GetFileLength", &mut crate::args![file])?)
    }

    /// Absolute form of a path relative to the object's working path.
    pub fn real_path(&self, file: &str) -> Result<String> {
        Ok(self
            .gateway
            .call_for_string("GetRealPath", &mut crate::args![file])?)
    }

    pub fn read_ini(&self, section: &str, key: &str, file: &str) -> Result<String> {
        Ok(self
            .gateway
            .call_for_string("ReadIni", &mut crate::args![section, key, file])?)
    }

    pub fn read_ini_pwd(&self, section: &str, key: &str, file: &str, password: &str) -> Result<String> {
        Ok(self.gateway.call_for_string(
            "ReadIniPwd",
            &mut crate::args![section, key, file, password],
        )?)
    }

    /// Show a directory picker. Empty when cancelled.
    pub fn select_directory(&self) -> Result<String> {
        Ok(self
            .gateway
            .call_for_string("SelectDirectory", &mut crate::args![])?)
    }

    /// Show a file picker. Empty when cancelled.
    pub fn select_file(&self) -> Result<String> {
        Ok(self.gateway.call_for_string("SelectFile", &mut crate::args![])?)
    }

    /// Append `content` to `file`.
    pub fn write_file(&self, file: &str, content: &str) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("WriteFile", &mut crate::args![file, content])?)
    }

    pub fn write_ini(&self, section: &str, key: &str, value: &str, file: &str) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("WriteIni", &mut crate::args![section, key, value, file])?)
    }

    pub fn write_ini_pwd(
        &self,
        section: &str,
        key: &str,
        value: &str,
        file: &str,
        password: &str,
    ) -> Result<()> {
        Ok(self.gateway.call_expect_1(
            "WriteIniPwd",
            &mut crate::args![section, key, value, file, password],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::{answering, succeeding};
    use crate::testing::Call;
    use crate::wire::WireValue;

    #[test]
    fn test_enum_ini_section() {
        let gw = answering("EnumIniSection", WireValue::Str("general|window|".to_string()));
        assert_eq!(
            FileFunctions::new(&gw).enum_ini_section("cfg.ini").unwrap(),
            vec!["general", "window"]
        );
    }

    #[test]
    fn test_enum_ini_key_empty() {
        let gw = answering("EnumIniKey", WireValue::Str(String::new()));
        assert!(FileFunctions::new(&gw)
            .enum_ini_key("missing", "cfg.ini")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_write_ini_pwd_argument_order() {
        let gw = succeeding();
        FileFunctions::new(&gw)
            .write_ini_pwd("s", "k", "v", "cfg.ini", "pw")
            .unwrap();
        let expected: Vec<WireValue> = ["s", "k", "v", "cfg.ini", "pw"]
            .into_iter()
            .map(WireValue::from)
            .collect();
        assert_eq!(
            gw.dispatch().calls(),
            vec![Call::with_args("WriteIniPwd", expected)]
        );
    }

    #[test]
    fn test_download_status_is_not_validated() {
        let gw = answering("DownloadFile", WireValue::Int(-1));
        assert_eq!(
            FileFunctions::new(&gw)
                .download_file("http://example.invalid/a.zip", "a.zip", 1000)
                .unwrap(),
            -1
        );
        assert_eq!(gw.dispatch().calls().len(), 1);
    }

    #[test]
    fn test_file_length_and_real_path() {
        let gw = answering("GetFileLength", WireValue::Int(1_048_576));
        assert_eq!(FileFunctions::new(&gw).file_length("big.bin").unwrap(), 1_048_576);

        let gw = answering("GetRealPath", WireValue::Str("C:\\work\\a.txt".to_string()));
        assert_eq!(
            FileFunctions::new(&gw).real_path("a.txt").unwrap(),
            "C:\\work\\a.txt"
        );
    }
}
