//! Host application automation.
//!
//! Launching the desktop application and editing its in-memory object model
//! (forms, controls, VBA) needs a live automation session with the host
//! process. The gateway reaches that capability only through
//! [`HostAutomation`], so a real automation backend can replace
//! [`PlaceholderAutomation`] without touching the dispatch layer.

use serde_json::Value;
use tracing::info;

use crate::access::error::GatewayResult;
use crate::access::models::{ControlInfo, ControlProperties, FormExport, ReportExport};

/// Operations that require automating the host application.
pub trait HostAutomation {
    /// Starts the host application.
    ///
    /// # Errors
    ///
    /// Returns an error if the application cannot be started.
    fn launch(&mut self) -> GatewayResult<()>;

    /// Shuts the host application down.
    ///
    /// # Errors
    ///
    /// Returns an error if the application cannot be closed.
    fn close(&mut self) -> GatewayResult<()>;

    /// Opens a form in the host application.
    ///
    /// # Errors
    ///
    /// Returns an error if the form cannot be opened.
    fn open_form(&mut self, form_name: &str) -> GatewayResult<()>;

    /// Closes an open form.
    ///
    /// # Errors
    ///
    /// Returns an error if the form cannot be closed.
    fn close_form(&mut self, form_name: &str) -> GatewayResult<()>;

    /// Reads the source of a VBA module.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be read.
    fn vba_code(&self, project_name: &str, module_name: &str) -> GatewayResult<String>;

    /// Replaces the source of a VBA module.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be written.
    fn set_vba_code(&mut self, project_name: &str, module_name: &str, code: &str)
        -> GatewayResult<()>;

    /// Appends a procedure to a VBA module.
    ///
    /// # Errors
    ///
    /// Returns an error if the procedure cannot be added.
    fn add_vba_procedure(
        &mut self,
        project_name: &str,
        module_name: &str,
        procedure_name: &str,
        code: &str,
    ) -> GatewayResult<()>;

    /// Compiles the VBA project.
    ///
    /// # Errors
    ///
    /// Returns an error if compilation fails.
    fn compile_vba(&mut self) -> GatewayResult<()>;

    /// Enumerates the controls on a form or report.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be inspected.
    fn form_controls(&self, form_name: &str) -> GatewayResult<Vec<ControlInfo>>;

    /// Reads every property of one control.
    ///
    /// # Errors
    ///
    /// Returns an error if the control cannot be inspected.
    fn control_properties(
        &self,
        form_name: &str,
        control_name: &str,
    ) -> GatewayResult<ControlProperties>;

    /// Sets one property of a control.
    ///
    /// # Errors
    ///
    /// Returns an error if the property cannot be set.
    fn set_control_property(
        &mut self,
        form_name: &str,
        control_name: &str,
        property_name: &str,
        value: &Value,
    ) -> GatewayResult<()>;

    /// Creates a form from an exported document.
    ///
    /// # Errors
    ///
    /// Returns an error if the form cannot be created.
    fn import_form(&mut self, form: &FormExport) -> GatewayResult<()>;

    /// Deletes a form.
    ///
    /// # Errors
    ///
    /// Returns an error if the form cannot be deleted.
    fn delete_form(&mut self, form_name: &str) -> GatewayResult<()>;

    /// Creates a report from an exported document.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be created.
    fn import_report(&mut self, report: &ReportExport) -> GatewayResult<()>;

    /// Deletes a report.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be deleted.
    fn delete_report(&mut self, report_name: &str) -> GatewayResult<()>;
}

/// Automation backend that performs no host calls.
///
/// Mutating operations are logged and acknowledged. Read operations return
/// fixed placeholder data: one `TextBox` control per form and a comment line
/// in place of module source.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderAutomation;

impl PlaceholderAutomation {
    /// Creates the placeholder backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn placeholder_control(name: &str) -> ControlInfo {
        ControlInfo {
            name: name.to_string(),
            control_type: "TextBox".to_string(),
            left: 100,
            top: 100,
            width: 200,
            height: 25,
            visible: true,
            enabled: true,
        }
    }
}

impl HostAutomation for PlaceholderAutomation {
    fn launch(&mut self) -> GatewayResult<()> {
        info!("Host application launch requested (no automation session)");
        Ok(())
    }

    fn close(&mut self) -> GatewayResult<()> {
        info!("Host application close requested (no automation session)");
        Ok(())
    }

    fn open_form(&mut self, form_name: &str) -> GatewayResult<()> {
        info!(form = form_name, "Open form requested (no automation session)");
        Ok(())
    }

    fn close_form(&mut self, form_name: &str) -> GatewayResult<()> {
        info!(form = form_name, "Close form requested (no automation session)");
        Ok(())
    }

    fn vba_code(&self, _project_name: &str, module_name: &str) -> GatewayResult<String> {
        Ok(format!("' VBA code for {module_name} would be retrieved here"))
    }

    fn set_vba_code(
        &mut self,
        project_name: &str,
        module_name: &str,
        code: &str,
    ) -> GatewayResult<()> {
        info!(
            project = project_name,
            module = module_name,
            bytes = code.len(),
            "Set VBA code requested (no automation session)"
        );
        Ok(())
    }

    fn add_vba_procedure(
        &mut self,
        project_name: &str,
        module_name: &str,
        procedure_name: &str,
        code: &str,
    ) -> GatewayResult<()> {
        info!(
            project = project_name,
            module = module_name,
            procedure = procedure_name,
            bytes = code.len(),
            "Add VBA procedure requested (no automation session)"
        );
        Ok(())
    }

    fn compile_vba(&mut self) -> GatewayResult<()> {
        info!("VBA compile requested (no automation session)");
        Ok(())
    }

    fn form_controls(&self, _form_name: &str) -> GatewayResult<Vec<ControlInfo>> {
        Ok(vec![Self::placeholder_control("PlaceholderControl")])
    }

    fn control_properties(
        &self,
        _form_name: &str,
        control_name: &str,
    ) -> GatewayResult<ControlProperties> {
        Ok(ControlProperties {
            control: Self::placeholder_control(control_name),
            back_color: 16_777_215,
            fore_color: 0,
            font_name: "Arial".to_string(),
            font_size: 10,
            font_bold: false,
            font_italic: false,
        })
    }

    fn set_control_property(
        &mut self,
        form_name: &str,
        control_name: &str,
        property_name: &str,
        value: &Value,
    ) -> GatewayResult<()> {
        info!(
            form = form_name,
            control = control_name,
            property = property_name,
            %value,
            "Set control property requested (no automation session)"
        );
        Ok(())
    }

    fn import_form(&mut self, form: &FormExport) -> GatewayResult<()> {
        info!(
            form = %form.name,
            controls = form.controls.len(),
            "Form import requested (no automation session)"
        );
        Ok(())
    }

    fn delete_form(&mut self, form_name: &str) -> GatewayResult<()> {
        info!(form = form_name, "Form delete requested (no automation session)");
        Ok(())
    }

    fn import_report(&mut self, report: &ReportExport) -> GatewayResult<()> {
        info!(
            report = %report.name,
            controls = report.controls.len(),
            "Report import requested (no automation session)"
        );
        Ok(())
    }

    fn delete_report(&mut self, report_name: &str) -> GatewayResult<()> {
        info!(report = report_name, "Report delete requested (no automation session)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_controls() {
        let automation = PlaceholderAutomation::new();
        let controls = automation.form_controls("frmMain").unwrap();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].name, "PlaceholderControl");
        assert_eq!(controls[0].control_type, "TextBox");
    }

    #[test]
    fn placeholder_properties_use_requested_name() {
        let automation = PlaceholderAutomation::new();
        let props = automation.control_properties("frmMain", "txtCity").unwrap();
        assert_eq!(props.control.name, "txtCity");
        assert_eq!(props.font_name, "Arial");
    }

    #[test]
    fn placeholder_vba_code_mentions_module() {
        let automation = PlaceholderAutomation::new();
        let code = automation.vba_code("CurrentProject", "modUtils").unwrap();
        assert!(code.contains("modUtils"));
    }
}
