//! The taxi app's admin registrations.

use crate::model_admin::ModelAdmin;
use crate::site::AdminSite;

pub const APP_LABEL: &str = "taxi";

/// Manufacturers use the default configuration.
pub fn manufacturer_admin() -> ModelAdmin {
    ModelAdmin::new(APP_LABEL, "manufacturer").fields(vec!["name", "country"])
}

/// Cars are searchable by model and filterable by manufacturer.
pub fn car_admin() -> ModelAdmin {
    ModelAdmin::new(APP_LABEL, "car")
        .search_fields(vec!["model"])
        .list_filter(vec!["manufacturer"])
        .fields(vec!["model", "manufacturer", "drivers"])
}

/// Drivers show their license number in the changelist and on both forms.
pub fn driver_admin() -> ModelAdmin {
    ModelAdmin::new(APP_LABEL, "driver")
        .list_display(vec![
            "username",
            "email",
            "first_name",
            "last_name",
            "is_staff",
            "license_number",
        ])
        .search_fields(vec!["username", "first_name", "last_name", "email"])
        .list_filter(vec!["is_staff", "is_superuser", "is_active"])
        .fields(vec![
            "username",
            "first_name",
            "last_name",
            "email",
            "is_active",
            "is_staff",
            "is_superuser",
            "license_number",
        ])
        .add_fields(vec![
            "username",
            "password1",
            "password2",
            "first_name",
            "last_name",
            "license_number",
        ])
}

/// Registers manufacturer, car and driver.
pub fn register_taxi_models(site: &mut AdminSite) {
    site.register(manufacturer_admin());
    site.register(car_admin());
    site.register(driver_admin());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_admin() {
        let admin = driver_admin();
        assert!(admin.list_display.contains(&"license_number".to_string()));
        assert!(admin.fields.contains(&"license_number".to_string()));
        for field in ["first_name", "last_name", "license_number"] {
            assert!(admin.add_fields.contains(&field.to_string()), "{field}");
        }
    }

    #[test]
    fn test_car_admin() {
        let admin = car_admin();
        assert_eq!(admin.search_fields, vec!["model"]);
        assert_eq!(admin.list_filter, vec!["manufacturer"]);
    }

    #[test]
    fn test_manufacturer_admin_is_default() {
        let admin = manufacturer_admin();
        assert_eq!(admin.list_display, vec!["__str__"]);
        assert!(admin.search_fields.is_empty());
        assert!(admin.list_filter.is_empty());
    }

    #[test]
    fn test_register_all() {
        let mut site = AdminSite::new("admin");
        register_taxi_models(&mut site);
        assert_eq!(site.model_count(), 3);
        assert!(site.is_registered("taxi.driver"));
        assert!(site.get_model_admin("taxi", "car").is_some());
    }
}
